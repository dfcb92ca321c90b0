//! Static dispatch parser enum for zero-cost abstraction over manifest parsers.

use std::collections::HashMap;
use std::path::Path;

use crate::{
    Result,
    manifest::{
        maven::Maven,
        npm::Npm,
        traits::ManifestParser,
        types::{Ecosystem, PackageInfo},
    },
};

/// Ecosystem-specific manifest parser with static dispatch.
///
/// This enum wraps the concrete parser implementations, allowing the
/// compiler to use static dispatch instead of vtable lookups while callers
/// still program against the [`ManifestParser`] contract.
pub enum Parser {
    /// npm parser for package-lock.json, yarn.lock, and pnpm-lock.yaml
    Npm(Npm),
    /// Maven parser for pom.xml
    Maven(Maven),
}

impl Parser {
    /// Select the parser that handles the given manifest path, if any.
    pub fn for_path(path: &Path) -> Option<Self> {
        [Parser::Npm(Npm::new()), Parser::Maven(Maven::new())]
            .into_iter()
            .find(|parser| parser.can_handle(path))
    }
}

impl ManifestParser for Parser {
    fn ecosystem(&self) -> Ecosystem {
        match self {
            Parser::Npm(parser) => parser.ecosystem(),
            Parser::Maven(parser) => parser.ecosystem(),
        }
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        match self {
            Parser::Npm(parser) => parser.file_patterns(),
            Parser::Maven(parser) => parser.file_patterns(),
        }
    }

    fn parse(&self, path: &Path) -> Result<Vec<PackageInfo>> {
        match self {
            Parser::Npm(parser) => parser.parse(path),
            Parser::Maven(parser) => parser.parse(path),
        }
    }

    fn update(
        &self,
        path: &Path,
        updates: &HashMap<String, String>,
    ) -> Result<String> {
        match self {
            Parser::Npm(parser) => parser.update(path, updates),
            Parser::Maven(parser) => parser.update(path, updates),
        }
    }

    fn validate(&self, content: &str) -> bool {
        match self {
            Parser::Npm(parser) => parser.validate(content),
            Parser::Maven(parser) => parser.validate(content),
        }
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parser::Npm(_) => write!(f, "Parser::Npm"),
            Parser::Maven(_) => write!(f, "Parser::Maven"),
        }
    }
}
