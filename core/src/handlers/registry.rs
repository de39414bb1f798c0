//! Category -> handler table.
//!
//! Composed explicitly at startup: built-ins first via
//! [`HandlerRegistry::register_builtins`], then game-specific handlers in the
//! order the composition code lists them. A second handler for the same
//! category is an error, never a silent overwrite.

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use tempora_types::ModifierCategory;

use super::{ModifierHandler, MovementHandler, RegenerationHandler, ShieldHandler, VisibilityHandler};
use crate::error::RegistryError;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<ModifierCategory, Rc<dyn ModifierHandler>>,
    /// Categories in registration order
    order: Vec<ModifierCategory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in handlers
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_builtins()?;
        Ok(registry)
    }

    pub fn register_builtins(&mut self) -> Result<(), RegistryError> {
        for (category, handler) in builtin_table() {
            self.register_shared(category, handler)?;
        }
        Ok(())
    }

    pub fn register<H>(&mut self, category: ModifierCategory, handler: H) -> Result<(), RegistryError>
    where
        H: ModifierHandler + 'static,
    {
        self.register_shared(category, Rc::new(handler))
    }

    /// Register a handler instance that may also serve other categories
    pub fn register_shared(
        &mut self,
        category: ModifierCategory,
        handler: Rc<dyn ModifierHandler>,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&category) {
            return Err(RegistryError::DuplicateHandler { category });
        }
        tracing::debug!(category = %category, "registered modifier handler");
        self.order.push(category.clone());
        self.handlers.insert(category, handler);
        Ok(())
    }

    /// The handler for `category`. `None` means the category is query-only.
    pub fn get(&self, category: &ModifierCategory) -> Option<&dyn ModifierHandler> {
        self.handlers.get(category).map(|handler| handler.as_ref())
    }

    pub fn contains(&self, category: &ModifierCategory) -> bool {
        self.handlers.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &ModifierCategory> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("categories", &self.order)
            .finish()
    }
}

/// Built-in handlers, in registration order
fn builtin_table() -> Vec<(ModifierCategory, Rc<dyn ModifierHandler>)> {
    let movement: Rc<dyn ModifierHandler> = Rc::new(MovementHandler);
    let shield: Rc<dyn ModifierHandler> = Rc::new(ShieldHandler);
    let visibility: Rc<dyn ModifierHandler> = Rc::new(VisibilityHandler);
    let regeneration: Rc<dyn ModifierHandler> = Rc::new(RegenerationHandler);
    vec![
        (ModifierCategory::SpeedBoost, Rc::clone(&movement)),
        (ModifierCategory::SpeedReduction, Rc::clone(&movement)),
        (ModifierCategory::Stun, movement),
        (ModifierCategory::Shield, shield),
        (ModifierCategory::Invisibility, visibility),
        (ModifierCategory::Regeneration, regeneration),
    ]
}
