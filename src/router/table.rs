use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::RouteError;
use crate::http::request::{PathMatch, Request};
use crate::http::response::Response;
use crate::router::Handler;

/// A path pattern and the handlers registered against it, one per method.
pub struct RouteEntry {
    pattern: String,
    regex: Regex,
    methods: HashMap<String, Handler>,
}

impl RouteEntry {
    fn new(pattern: &str) -> Result<Self, RouteError> {
        // Patterns must match the whole path.
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            methods: HashMap::new(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods().collect();
        methods.sort_unstable();
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern)
            .field("methods", &methods)
            .finish()
    }
}

/// Collects routes before the server starts.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    resources: Vec<RouteEntry>,
    default_resources: Vec<RouteEntry>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an application route.
    ///
    /// Registering a pattern that already exists adds the method to that
    /// entry; registering the same pattern and method again replaces the
    /// handler. Entries keep registration order.
    pub fn resource<F>(&mut self, pattern: &str, method: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        register(&mut self.resources, pattern, method, Arc::new(handler))?;
        Ok(self)
    }

    /// Registers a fallback route, consulted after every application route.
    pub fn default_resource<F>(
        &mut self,
        pattern: &str,
        method: &str,
        handler: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        register(&mut self.default_resources, pattern, method, Arc::new(handler))?;
        Ok(self)
    }

    /// Freezes the registrations: application routes first, then defaults.
    pub fn build(self) -> RouteTable {
        let mut routes = self.resources;
        routes.extend(self.default_resources);
        RouteTable { routes }
    }
}

fn register(
    table: &mut Vec<RouteEntry>,
    pattern: &str,
    method: &str,
    handler: Handler,
) -> Result<(), RouteError> {
    let index = match table.iter().position(|entry| entry.pattern == pattern) {
        Some(index) => index,
        None => {
            table.push(RouteEntry::new(pattern)?);
            table.len() - 1
        }
    };

    if table[index]
        .methods
        .insert(method.to_string(), handler)
        .is_some()
    {
        tracing::debug!(pattern, method, "replaced route handler");
    }
    Ok(())
}

/// Outcome of resolving a request against the route table.
pub enum Resolution<'a> {
    Found {
        handler: &'a Handler,
        path_match: PathMatch,
        pattern: &'a str,
    },
    NotFound,
}

impl fmt::Debug for Resolution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Found {
                path_match,
                pattern,
                ..
            } => f
                .debug_struct("Found")
                .field("pattern", pattern)
                .field("path_match", path_match)
                .finish(),
            Resolution::NotFound => f.write_str("NotFound"),
        }
    }
}

/// The resolved route list: every application route followed by every
/// default route. Immutable once built.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Finds the first entry whose pattern matches the whole `path` and that
    /// has a handler for `method`.
    ///
    /// An entry matching the path but not the method does not stop the scan;
    /// later entries (typically defaults) still get a chance.
    pub fn resolve(&self, path: &str, method: &str) -> Resolution<'_> {
        for entry in &self.routes {
            let Some(caps) = entry.regex.captures(path) else {
                continue;
            };
            let Some(handler) = entry.methods.get(method) else {
                tracing::trace!(pattern = %entry.pattern, method, "path matched without method");
                continue;
            };

            return Resolution::Found {
                handler,
                path_match: PathMatch::from_captures(&entry.regex, &caps),
                pattern: &entry.pattern,
            };
        }

        Resolution::NotFound
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
