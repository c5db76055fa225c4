use clap::{Parser, Subcommand};
use quill_render::{Context, Engine, EngineOptions};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill - Liquid-style template renderer for plain-text documents")]
#[command(version)]
struct Cli {
    /// Parsed templates kept in the cache (0 disables it)
    #[arg(long, global = true, default_value_t = EngineOptions::default().cache_capacity)]
    cache_capacity: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template against a JSON context
    Render {
        /// Template file
        path: PathBuf,

        /// JSON file holding the context object
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Write the output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a template for syntax errors without rendering it
    Check {
        /// Template file
        path: PathBuf,
    },

    /// Render one of the bundled demo documents
    Demo {
        /// Route name, e.g. `invoice`
        route: Option<String>,

        /// List the available routes
        #[arg(long)]
        list: bool,
    },
}

/// A bundled template and context pair, addressed by route name.
struct Demo {
    route: &'static str,
    template: &'static str,
    context: &'static str,
    failure: &'static str,
}

const DEMOS: &[Demo] = &[
    Demo {
        route: "order-receipt",
        template: include_str!("../../../demos/order-receipt.liquid"),
        context: include_str!("../../../demos/order-receipt.json"),
        failure: "Error rendering order receipt.",
    },
    Demo {
        route: "invoice",
        template: include_str!("../../../demos/invoice.liquid"),
        context: include_str!("../../../demos/invoice.json"),
        failure: "Error rendering invoice.",
    },
    Demo {
        route: "subscription_status",
        template: include_str!("../../../demos/subscription_status.liquid"),
        context: include_str!("../../../demos/subscription.json"),
        failure: "Error rendering subscription status.",
    },
    Demo {
        route: "subscriptionrenewal",
        template: include_str!("../../../demos/subscriptionrenewal.liquid"),
        context: include_str!("../../../demos/subscription.json"),
        failure: "Error rendering subscription renewal.",
    },
];

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let engine = Engine::with_options(EngineOptions {
        cache_capacity: cli.cache_capacity,
    });

    match cli.command {
        Command::Render {
            path,
            context,
            output,
        } => cmd_render(&engine, &path, context.as_deref(), output.as_deref()),
        Command::Check { path } => cmd_check(&path),
        Command::Demo { route, list } => match route {
            Some(route) if !list => cmd_demo(&engine, &route),
            _ => list_demos(),
        },
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Log the detail, show the caller only `public`, and exit.
fn fail(detail: impl Display, public: &str) -> ! {
    tracing::error!(error = %detail, "{public}");
    eprintln!("{public}");
    std::process::exit(1);
}

fn read_source(path: &Path) -> String {
    if !path.exists() {
        eprintln!("Error: file not found: {}", path.display());
        std::process::exit(1);
    }
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn read_context(path: Option<&Path>) -> Context {
    let Some(path) = path else {
        return Context::new();
    };
    match Context::from_json_str(&read_source(path)) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error in {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn cmd_render(engine: &Engine, path: &Path, context: Option<&Path>, output: Option<&Path>) {
    let source = read_source(path);
    let ctx = read_context(context);

    let rendered = match engine.render_source(&source, &ctx) {
        Ok(rendered) => rendered,
        Err(e) => fail(&e, e.public_message()),
    };

    match output {
        Some(out) => {
            if let Err(e) = std::fs::write(out, &rendered) {
                eprintln!("Error writing {}: {e}", out.display());
                std::process::exit(1);
            }
            eprintln!("Wrote: {}", out.display());
        }
        None => print!("{rendered}"),
    }
}

fn cmd_check(path: &Path) {
    let source = read_source(path);

    if let Err(e) = quill_parser::Parser::parse(&source) {
        eprintln!("{}: {e}", path.display());
        std::process::exit(1);
    }

    eprintln!("OK: {}", path.display());
}

fn cmd_demo(engine: &Engine, route: &str) {
    let Some(demo) = DEMOS.iter().find(|d| d.route == route) else {
        eprintln!("Unknown demo route '{route}'");
        list_demos();
        std::process::exit(1);
    };

    let ctx = match Context::from_json_str(demo.context) {
        Ok(ctx) => ctx,
        Err(e) => fail(e, demo.failure),
    };
    match engine.render_source(demo.template, &ctx) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => fail(e, demo.failure),
    }
}

fn list_demos() {
    for demo in DEMOS {
        println!("{}", demo.route);
    }
}
