//! Route table
//!
//! An ordered list of named routes under one application namespace.
//! Built once, then shared read-only between connection tasks.

use std::collections::HashMap;

use super::converter::ParamValue;
use super::error::RouteError;
use super::pattern::RoutePattern;

/// A single pattern-to-handler binding
#[derive(Debug, Clone)]
pub struct Route<H> {
    pattern: RoutePattern,
    handler: H,
    name: String,
}

impl<H> Route<H> {
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Name without the namespace prefix
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of a successful resolve
#[derive(Debug)]
pub struct ResolvedRoute<'a, H> {
    /// Namespaced route name, e.g. `shop:single_course`
    pub name: String,
    pub route: &'a Route<H>,
    /// Converted placeholder values in declaration order
    pub args: Vec<(String, ParamValue)>,
}

impl<H> ResolvedRoute<'_, H> {
    pub const fn handler(&self) -> &H {
        &self.route.handler
    }

    /// Look up a captured argument by placeholder name
    pub fn arg(&self, name: &str) -> Option<&ParamValue> {
        self.args.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

/// Immutable, ordered route table
#[derive(Debug)]
pub struct RouteTable<H> {
    app_name: String,
    routes: Vec<Route<H>>,
    /// Short route name -> index into `routes`
    name_index: HashMap<String, usize>,
}

impl<H> RouteTable<H> {
    pub fn builder(app_name: impl Into<String>) -> RouteTableBuilder<H> {
        RouteTableBuilder {
            app_name: app_name.into(),
            entries: Vec::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Namespaced names of all routes, in matching order
    pub fn names(&self) -> Vec<String> {
        self.routes.iter().map(|r| self.qualify(&r.name)).collect()
    }

    /// Find the first route matching `path`.
    ///
    /// One leading `/` is stripped before matching. A placeholder whose text
    /// cannot be converted counts as a miss and later routes are still tried.
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute<'_, H>, RouteError> {
        let relative = path.strip_prefix('/').unwrap_or(path);

        self.routes
            .iter()
            .find_map(|route| {
                route.pattern.captures(relative).map(|args| ResolvedRoute {
                    name: self.qualify(&route.name),
                    route,
                    args,
                })
            })
            .ok_or_else(|| RouteError::not_found(path))
    }

    /// Build the absolute path for a named route.
    ///
    /// `name` may be namespaced (`shop:single_course`) or bare; a namespace
    /// other than this table's is rejected.
    pub fn reverse(&self, name: &str, args: &[(&str, &str)]) -> Result<String, RouteError> {
        let short = match name.rsplit_once(':') {
            Some((namespace, short)) if namespace == self.app_name => short,
            Some((namespace, _)) => {
                return Err(RouteError::no_reverse_match(
                    name,
                    format!("'{namespace}' is not a registered namespace"),
                ));
            }
            None => name,
        };

        let index = self
            .name_index
            .get(short)
            .ok_or_else(|| RouteError::no_reverse_match(name, "not a valid view name"))?;

        self.routes[*index]
            .pattern
            .reverse(args)
            .map(|relative| format!("/{relative}"))
            .map_err(|reason| RouteError::no_reverse_match(name, reason))
    }

    fn qualify(&self, name: &str) -> String {
        if self.app_name.is_empty() {
            name.to_string()
        } else {
            format!("{}:{name}", self.app_name)
        }
    }
}

/// Collects route declarations and validates them on `build`
#[derive(Debug)]
pub struct RouteTableBuilder<H> {
    app_name: String,
    entries: Vec<(String, H, String)>,
}

impl<H> RouteTableBuilder<H> {
    #[must_use]
    pub fn route(mut self, pattern: &str, handler: H, name: &str) -> Self {
        self.entries
            .push((pattern.to_string(), handler, name.to_string()));
        self
    }

    /// Compile every pattern and check that patterns and names are unique
    pub fn build(self) -> Result<RouteTable<H>, RouteError> {
        let mut routes = Vec::with_capacity(self.entries.len());
        let mut name_index = HashMap::with_capacity(self.entries.len());

        for (pattern, handler, name) in self.entries {
            if routes
                .iter()
                .any(|r: &Route<H>| r.pattern.as_str() == pattern)
            {
                return Err(RouteError::DuplicatePattern(pattern));
            }
            if name_index.contains_key(&name) {
                return Err(RouteError::DuplicateName(name));
            }

            let pattern = RoutePattern::parse(&pattern)?;
            name_index.insert(name.clone(), routes.len());
            routes.push(Route {
                pattern,
                handler,
                name,
            });
        }

        Ok(RouteTable {
            app_name: self.app_name,
            routes,
            name_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        RouteTable::builder("blog")
            .route("", "home", "home")
            .route("post/<int:id>", "post_by_id", "post")
            .route("post/<slug:slug>", "post_by_slug", "post_slug")
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_root() {
        let t = table();
        let resolved = t.resolve("/").unwrap();
        assert_eq!(*resolved.handler(), "home");
        assert_eq!(resolved.name, "blog:home");
        assert!(resolved.args.is_empty());
    }

    #[test]
    fn test_conversion_failure_falls_through() {
        let t = table();
        // Not an int, but a valid slug
        let resolved = t.resolve("/post/hello-world").unwrap();
        assert_eq!(*resolved.handler(), "post_by_slug");

        let resolved = t.resolve("/post/7").unwrap();
        assert_eq!(*resolved.handler(), "post_by_id");
        assert_eq!(resolved.arg("id"), Some(&ParamValue::Int(7)));
    }

    #[test]
    fn test_first_match_wins() {
        let t: RouteTable<u8> = RouteTable::builder("app")
            .route("<str:any>", 1, "any")
            .route("fixed", 2, "fixed")
            .build()
            .unwrap();
        assert_eq!(*t.resolve("/fixed").unwrap().handler(), 1);
    }

    #[test]
    fn test_not_found() {
        let t = table();
        let err = t.resolve("/missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No route matched path '/missing'");
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = RouteTable::builder("app")
            .route("a", 1, "a")
            .route("b", 2, "a")
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateName(n) if n == "a"));

        let err = RouteTable::builder("app")
            .route("a", 1, "a")
            .route("a", 2, "b")
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteError::DuplicatePattern(p) if p == "a"));
    }

    #[test]
    fn test_reverse_namespaces() {
        let t = table();
        assert_eq!(t.reverse("blog:home", &[]).unwrap(), "/");
        assert_eq!(t.reverse("post", &[("id", "3")]).unwrap(), "/post/3");
        assert!(matches!(
            t.reverse("shop:home", &[]),
            Err(RouteError::NoReverseMatch { .. })
        ));
        assert!(matches!(
            t.reverse("blog:nope", &[]),
            Err(RouteError::NoReverseMatch { .. })
        ));
    }

    #[test]
    fn test_empty_namespace_names() {
        let t: RouteTable<u8> = RouteTable::builder("").route("", 0, "root").build().unwrap();
        assert_eq!(t.names(), vec!["root".to_string()]);
        assert_eq!(t.resolve("/").unwrap().name, "root");
    }
}
