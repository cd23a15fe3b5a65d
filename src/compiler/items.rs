//! Array/Item Compiler
//!
//! Resolves the element shape of an array and the nested shape of an
//! `object` field that carries `items`.

use super::{Compiler, ResolutionContext};
use crate::descriptor::ItemsDescriptor;
use crate::validator::Validator;

impl Compiler {
    /// Compile an items descriptor.
    ///
    /// With no descriptor the shape is unknown and the result is a list of
    /// permissive records. Array fields wrap this result once more, so an
    /// `array` without `items` expects a list of such lists.
    pub fn compile_items<'s>(
        &mut self,
        items: Option<&'s ItemsDescriptor>,
        ctx: Option<&ResolutionContext<'s>>,
    ) -> Validator {
        match items {
            None => Validator::array_of(Validator::Permissive),
            Some(ItemsDescriptor::Reference(reference)) => self.resolve(reference, ctx),
            Some(ItemsDescriptor::Inline(model)) => self.compile_model(model, ctx),
        }
    }
}
