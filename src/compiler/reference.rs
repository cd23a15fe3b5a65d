//! Reference Resolver

use tracing::{debug, trace};

use super::{Compiler, Descent, ResolutionContext};
use crate::descriptor::{ref_model_name, ReferenceDescriptor};
use crate::validator::Validator;

impl Compiler {
    /// Resolve a `$ref` descriptor to the validator of its target model
    pub fn resolve<'s>(
        &mut self,
        reference: &'s ReferenceDescriptor,
        ctx: Option<&ResolutionContext<'s>>,
    ) -> Validator {
        self.resolve_reference(&reference.target, ctx)
    }

    /// Resolve a raw ref pointer.
    ///
    /// Never fails: a missing schema, a cycle, a depth overrun or a dangling
    /// target each yield the permissive placeholder.
    pub fn resolve_reference<'s>(
        &mut self,
        target: &'s str,
        ctx: Option<&ResolutionContext<'s>>,
    ) -> Validator {
        let name = ref_model_name(target);

        let Some(ctx) = ctx else {
            debug!(target_model = name, "no schema to resolve against");
            self.diagnostics.missing_registry(name);
            return Validator::Permissive;
        };

        match ctx.descend(name) {
            Descent::Cycle => {
                debug!(target_model = name, trail = %ctx.trail(), "cyclic reference, using placeholder");
                self.diagnostics.cyclic_reference(name, &ctx.trail());
                Validator::Permissive
            }
            Descent::DepthExceeded => {
                debug!(target_model = name, depth = ctx.depth(), "reference depth exceeded, using placeholder");
                self.diagnostics.depth_exceeded(name, &ctx.trail(), ctx.max_depth());
                Validator::Permissive
            }
            Descent::Proceed(next) => {
                let Some(model) = next.lookup(name) else {
                    debug!(target_model = name, "dangling reference, using placeholder");
                    self.diagnostics.dangling_reference(name, &ctx.trail());
                    return Validator::Permissive;
                };
                trace!(target_model = name, depth = next.depth(), "descending into reference");
                self.compile_model(model, Some(&next))
            }
        }
    }
}
