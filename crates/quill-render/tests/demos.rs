//! End-to-end rendering of the bundled demo documents.

use pretty_assertions::assert_eq;
use quill_render::{Context, Engine, Value};

const RECEIPT: &str = include_str!("../../../demos/order-receipt.liquid");
const RECEIPT_CTX: &str = include_str!("../../../demos/order-receipt.json");
const INVOICE: &str = include_str!("../../../demos/invoice.liquid");
const INVOICE_CTX: &str = include_str!("../../../demos/invoice.json");
const STATUS: &str = include_str!("../../../demos/subscription_status.liquid");
const RENEWAL: &str = include_str!("../../../demos/subscriptionrenewal.liquid");
const SUBSCRIPTION_CTX: &str = include_str!("../../../demos/subscription.json");

fn render(template: &str, context: &str) -> String {
    let engine = Engine::new();
    let ctx = Context::from_json_str(context).unwrap();
    engine.render_source(template, &ctx).unwrap()
}

#[test]
fn test_order_receipt() {
    let expected = concat!(
        "\n",
        "Order Receipt for Jordan Taylor\n",
        "\n",
        "---\n",
        "Order Details\n",
        "---\n",
        "Order ID: ORD-1001\n",
        "Order Date: 2025-09-01\n",
        "Payment Status: Paid\n",
        "\n",
        "Items:\n",
        "\n",
        "- Wireless Headphones (x1) — USD 99.99\n",
        "\n",
        "- USB-C Cable (x2) — USD 9.99\n",
        "\n",
        "\n",
        "Subtotal: USD 119.97\n",
        "Tax: USD 9.60\n",
        "Total: USD 129.57\n",
        "\n",
        "---\n",
        "Shipping To:\n",
        "Jordan Taylor\n",
        "123 Main St\n",
        "Austin, TX 73301\n",
    );
    assert_eq!(render(RECEIPT, RECEIPT_CTX), expected);
}

#[test]
fn test_subscription_status_takes_past_due_branch() {
    let expected = concat!(
        "\n",
        "Hello Alex,\n",
        "\n",
        "\n",
        "Our records show your account is past due. Please update your payment information to ensure uninterrupted service.\n",
        "\n",
        "\n",
        "Subscription ID: 8ad09be48a22193c018a38a7295064ac\n",
    );
    assert_eq!(render(STATUS, SUBSCRIPTION_CTX), expected);
}

#[test]
fn test_subscription_status_other_branches() {
    let engine = Engine::new();
    let mut ctx = Context::from_json_str(SUBSCRIPTION_CTX).unwrap();

    ctx.insert(
        "Subscription",
        [("Status", "Active"), ("Id", "S-1")]
            .into_iter()
            .collect::<Value>(),
    );
    let out = engine.render_source(STATUS, &ctx).unwrap();
    assert!(out.contains("Your subscription is active"));
    assert!(!out.contains("past due"));

    ctx.insert("Subscription", [("Status", "Suspended")].into_iter().collect::<Value>());
    let out = engine.render_source(STATUS, &ctx).unwrap();
    assert!(out.contains("There is an issue with your subscription."));
    assert!(out.ends_with("Subscription ID: \n"));
}

#[test]
fn test_subscription_renewal() {
    let expected = concat!(
        "\n",
        "Subscription Renewal Notice for ALEX\n",
        "\n",
        "Your 'Ford Connected Charge Station' plan, which renews on September 30, 2025, includes the following features:\n",
        "\n",
        "\n",
        "- Remote Power Management\n",
        "\n",
        "- Usage Analytics\n",
        "\n",
        "- Scheduled Charging\n",
        "\n",
        "\n",
        "Please ensure your payment method is up to date.\n",
    );
    assert_eq!(render(RENEWAL, SUBSCRIPTION_CTX), expected);
}

#[test]
fn test_invoice() {
    let out = render(INVOICE, INVOICE_CTX);

    assert!(out.starts_with("\n\n\nHello Alex,\n"));
    assert!(out.contains("Here is your invoice INV00098765 from Ford Connected Services, generated on "));
    assert!(!out.contains("generated on now"));
    assert!(out.contains("Due Date:   September 10, 2025\n"));
    assert!(out.contains("Amount Due: $ 212.00\n"));
    assert!(out.contains("Please make your payment by the due date"));
    assert!(!out.contains("fully paid"));

    assert!(out.contains("\nFordPass Pro - Annual Subscription   1    $ 150.00\n"));
    assert!(out.contains("\nFord Secure Add-on   1    $ 50.00\n"));
    assert!(out.contains("\nOne-Time Setup Fee   1    $ 25.00\n"));
    assert!(out.contains("\nLoyalty Credit   1    ($ 25.00)\n"));

    assert!(out.contains("Subtotal:   $ 200.00\n"));
    assert!(out.contains("Tax:   $ 12.00\n"));
    assert!(out.contains("Amount Paid:   ($ 0.00)\n"));
    assert!(out.contains("Balance Due:   $  212.00\n"));
    assert!(out.contains("charges for this period total $ 200.00.\n"));
    assert!(out.contains("support team at 1-800-555-1234.\n"));
    assert!(out.ends_with("Sincerely,\nFord Connected Services\n"));
}

#[test]
fn test_invoice_fully_paid() {
    let engine = Engine::new();
    let mut json: serde_json::Value = serde_json::from_str(INVOICE_CTX).unwrap();
    json["Invoice"]["AmountPaid"] = serde_json::json!(212.0);
    let ctx = Context::from_json(json).unwrap();

    let out = engine.render_source(INVOICE, &ctx).unwrap();
    assert!(out.contains("Amount Due: $ 0.00\n"));
    assert!(out.contains("Thank you, this invoice has been fully paid."));
    assert!(!out.contains("Please make your payment"));
}

#[test]
fn test_demo_templates_are_cached_once() {
    let engine = Engine::new();
    let ctx = Context::from_json_str(RECEIPT_CTX).unwrap();
    let first = engine.render_source(RECEIPT, &ctx).unwrap();
    let second = engine.render_source(RECEIPT, &ctx).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.cache().len(), 1);
}
