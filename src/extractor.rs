//! @ai:module:intent Collect //@Load directives from a file into a registry
//! @ai:module:layer application
//! @ai:module:public_api extract_directives, DirectiveRegistry
//! @ai:module:depends_on annotation, arguments, tokenizer, error
//! @ai:module:stateless true

use crate::annotation::{LoadDirective, Marker};
use crate::arguments::parse_payload;
use crate::error::{Error, Result};
use crate::tokenizer::{find_empty_load, scan};
use std::collections::HashMap;

/// @ai:intent Label to directive mapping for one file
/// @ai:invariant labels are unique
#[derive(Debug, Clone, Default)]
pub struct DirectiveRegistry {
    directives: Vec<LoadDirective>,
    by_label: HashMap<String, usize>,
}

impl DirectiveRegistry {
    /// @ai:intent Register a directive, rejecting a label seen before
    /// @ai:post on error the registry is unchanged
    pub fn insert(&mut self, directive: LoadDirective) -> Result<()> {
        if self.by_label.contains_key(&directive.label) {
            return Err(Error::DuplicateLabel {
                label: directive.label,
            });
        }

        self.by_label
            .insert(directive.label.clone(), self.directives.len());
        self.directives.push(directive);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&LoadDirective> {
        self.by_label.get(label).map(|&idx| &self.directives[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadDirective> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// @ai:intent Parse every //@Load annotation of a file into a registry
/// @ai:pre text is the full content of one file
/// @ai:post registry holds one entry per annotation, in textual order
/// @ai:effects pure
/// @ai:edge_cases `//@Load()` anywhere in the file is EmptyArguments, a blank payload is MissingLabel
pub fn extract_directives(text: &str) -> Result<DirectiveRegistry> {
    let mut registry = DirectiveRegistry::default();

    if find_empty_load(text).is_some() {
        return Err(Error::EmptyArguments);
    }

    for occurrence in scan(text, Marker::Load) {
        let directive = parse_payload(&occurrence.payload)?;
        tracing::debug!(
            "line {}: {} `{}` with {} glob(s)",
            occurrence.line,
            Marker::Load,
            directive.label,
            directive.globs.len()
        );
        registry.insert(directive)?;
    }

    Ok(registry)
}
