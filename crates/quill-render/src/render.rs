//! Template rendering.

use quill_parser::ast::{ForLoop, IfBlock, Node};
use quill_parser::Template;

use crate::context::{Context, Scope};
use crate::error::RenderError;
use crate::eval::Evaluator;
use crate::filters::FilterRegistry;
use crate::value::Value;

/// Render a parsed template. All-or-nothing: on error no output is returned.
pub fn render(
    template: &Template,
    context: &Context,
    filters: &FilterRegistry,
) -> Result<String, RenderError> {
    let mut renderer = Renderer::new(context, filters);
    renderer.render_nodes(&template.nodes)?;
    Ok(renderer.output)
}

/// Walks the AST, appending to a buffer. Owns the per-render [`Scope`], so
/// concurrent renders of one template never share state. The buffer only
/// leaves through [`render`], and only on success.
pub(crate) struct Renderer<'a> {
    context: &'a Context,
    filters: &'a FilterRegistry,
    scope: Scope,
    output: String,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(context: &'a Context, filters: &'a FilterRegistry) -> Self {
        Self {
            context,
            filters,
            scope: Scope::new(),
            output: String::new(),
        }
    }

    fn eval(&self, expr: &quill_parser::Expression) -> Result<Value, RenderError> {
        Evaluator::new(self.context, &self.scope, self.filters).eval(expr)
    }

    pub(crate) fn render_nodes(&mut self, nodes: &[Node]) -> Result<(), RenderError> {
        for node in nodes {
            self.render_node(node)?;
        }
        Ok(())
    }

    fn render_node(&mut self, node: &Node) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => self.output.push_str(text),
            Node::Output(expr) => {
                let value = self.eval(expr)?;
                self.output.push_str(&value.to_string());
            }
            Node::If(block) => self.render_if(block)?,
            Node::For(for_loop) => self.render_for(for_loop)?,
            Node::Assign(assign) => {
                let value = self.eval(&assign.value)?;
                self.scope.set(&assign.name, value);
            }
        }
        Ok(())
    }

    /// First truthy branch wins; later conditions are not evaluated.
    fn render_if(&mut self, block: &IfBlock) -> Result<(), RenderError> {
        for branch in &block.branches {
            if self.eval(&branch.condition)?.is_truthy() {
                return self.render_nodes(&branch.body);
            }
        }
        match &block.otherwise {
            Some(body) => self.render_nodes(body),
            None => Ok(()),
        }
    }

    /// Iterates arrays only; anything else renders nothing. The loop variable
    /// shadows any outer binding and is restored afterwards. `assign`s made
    /// in the body stay visible after the loop.
    fn render_for(&mut self, for_loop: &ForLoop) -> Result<(), RenderError> {
        let Value::Array(items) = self.eval(&for_loop.source)? else {
            return Ok(());
        };
        let previous = self.scope.get(&for_loop.variable).cloned();
        for item in items {
            self.scope.set(&for_loop.variable, item);
            self.render_nodes(&for_loop.body)?;
        }
        self.scope.restore(&for_loop.variable, previous);
        Ok(())
    }
}
