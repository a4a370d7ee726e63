//! Algebraic simplification of unions and intersections.
//!
//! Rewrites happen in place on the arena slot, so every reference to a
//! simplified node (including cyclic ones) sees the same result.
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::ast::{Ast, AstId, AstKind};
use crate::generator::render::Renderer;
use crate::options::Options;

struct Optimizer<'a> {
    options: &'a Options,
    processed: HashSet<AstId>,
    rewrites: usize,
}

impl Optimizer<'_> {
    fn visit(&mut self, ast: &mut Ast, id: AstId) {
        if !self.processed.insert(id) {
            return;
        }
        match ast.kind(id) {
            AstKind::Union(_) | AstKind::Intersection(_) => self.simplify(ast, id),
            AstKind::Interface(_) | AstKind::Array(_) | AstKind::Tuple(_) => {
                for child in ast.children(id) {
                    self.visit(ast, child);
                }
            }
            _ => {}
        }
    }

    fn simplify(&mut self, ast: &mut Ast, id: AstId) {
        // leaves first
        for member in ast.children(id) {
            self.visit(ast, member);
        }
        let members = ast.children(id);

        // [A, B, Any] -> Any, then [A, B, Unknown] -> Unknown
        for top in [AstKind::Any, AstKind::Unknown] {
            if members.iter().any(|&m| *ast.kind(m) == top) {
                trace!(ast = id.index(), ?top, "set absorbed by top type");
                ast.get_mut(id).kind = top;
                self.rewrites += 1;
                return;
            }
        }

        let (anonymous, rendered) = {
            let mut renderer = Renderer::new(ast, self.options);
            let anonymous: Vec<String> = members
                .iter()
                .map(|&m| match ast.kind(m) {
                    AstKind::Enum(_) => renderer.render(m),
                    _ => renderer.render_raw(m),
                })
                .collect();
            let rendered: Vec<String> = members.iter().map(|&m| renderer.render(m)).collect();
            (anonymous, rendered)
        };

        let mut kept: Vec<(AstId, &str)> = members.iter().copied().zip(rendered.iter().map(String::as_str)).collect();

        // [A (named), A] -> [A (named)]
        let all_alike = anonymous.windows(2).all(|w| w[0] == w[1]);
        if all_alike && members.iter().any(|&m| ast.get(m).name().is_some()) {
            kept.retain(|(m, _)| ast.get(*m).name().is_some());
            trace!(ast = id.index(), kept = kept.len(), "anonymous aliases of a named member dropped");
        }

        // [A, B, B] -> [A, B]
        let mut seen = HashSet::new();
        kept.retain(|(_, text)| seen.insert(*text));

        let kept: Vec<AstId> = kept.into_iter().map(|(m, _)| m).collect();
        if kept.len() != members.len() {
            self.rewrites += 1;
            if let AstKind::Union(xs) | AstKind::Intersection(xs) = &mut ast.get_mut(id).kind {
                *xs = kept;
            }
        }
    }
}

/// Simplify every union and intersection reachable from `root`.
pub fn optimize(ast: &mut Ast, root: AstId, options: &Options) -> AstId {
    let mut optimizer = Optimizer { options, processed: HashSet::new(), rewrites: 0 };
    optimizer.visit(ast, root);
    debug!(visited = optimizer.processed.len(), rewrites = optimizer.rewrites, "optimized AST");
    root
}
