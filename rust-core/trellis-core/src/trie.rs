//! # Route Trie
//!
//! Segment trie with one terminal slot per HTTP method.
//!
//! At every node the children are tried in a fixed order: the static child
//! with the exact literal, then parameter children in declaration order
//! (each one validating the segment with its [`Constraint`]), then the
//! wildcard child. When a deeper branch fails the search backtracks and
//! tries the next candidate, so the result does not depend on the order in
//! which routes were registered (except between parameter siblings).

use crate::error::{Error, Result};
use crate::router::Method;
use crate::template::Segment;
use crate::types::{Constraint, ParamValue};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Route identifier, an index into the router's route table
pub type RouteId = usize;

/// A bound parameter as produced by the trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParam<'p> {
    /// Name declared in the template
    pub name: &'p str,
    /// Slice of the request path that matched
    pub raw: &'p str,
    /// Value produced by the constraint
    pub value: ParamValue,
}

/// Result of a trie lookup
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'p> {
    /// A route matched; params are in path order
    Found {
        /// Matched route
        route: RouteId,
        /// Bound parameters
        params: Vec<RawParam<'p>>,
    },
    /// The path exists but not for this method
    MethodNotAllowed(Vec<Method>),
    /// Nothing matched
    NotFound,
}

/// A terminal that can never be reached because an earlier unconstrained
/// parameter sibling accepts every segment it would
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Shadowed {
    /// Method of both terminals
    pub method: Method,
    /// Unreachable route
    pub route: RouteId,
    /// Route that always wins instead
    pub by: RouteId,
}

#[derive(Debug, Clone)]
struct Endpoint {
    route: RouteId,
    param_names: Vec<String>,
}

#[derive(Debug, Default)]
struct Node {
    statics: HashMap<String, Node>,
    params: Vec<(Constraint, Node)>,
    wildcard: Option<Box<Node>>,
    endpoints: BTreeMap<Method, Endpoint>,
}

/// A matched segment before names are attached
type Capture<'p> = (&'p str, ParamValue);

impl Node {
    fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
            && self.statics.is_empty()
            && self.params.is_empty()
            && self.wildcard.is_none()
    }

    fn find(&self, segments: &[Segment]) -> Option<&Self> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(self);
        };
        let child = match first {
            Segment::Static(s) => self.statics.get(s)?,
            Segment::Param { constraint, .. } => {
                &self.params.iter().find(|(c, _)| c == constraint)?.1
            }
            Segment::Wildcard { .. } => self.wildcard.as_deref()?,
        };
        child.find(rest)
    }

    fn find_or_create(&mut self, segments: &[Segment]) -> &mut Self {
        let Some((first, rest)) = segments.split_first() else {
            return self;
        };
        let child = match first {
            Segment::Static(s) => self.statics.entry(s.clone()).or_default(),
            Segment::Param { constraint, .. } => {
                let idx = match self.params.iter().position(|(c, _)| c == constraint) {
                    Some(idx) => idx,
                    None => {
                        self.params.push((constraint.clone(), Self::default()));
                        self.params.len() - 1
                    }
                };
                &mut self.params[idx].1
            }
            Segment::Wildcard { .. } => self.wildcard.get_or_insert_with(Box::default),
        };
        child.find_or_create(rest)
    }

    fn remove(&mut self, segments: &[Segment], method: Method) -> Option<Endpoint> {
        let Some((first, rest)) = segments.split_first() else {
            return self.endpoints.remove(&method);
        };
        match first {
            Segment::Static(s) => {
                let child = self.statics.get_mut(s)?;
                let removed = child.remove(rest, method);
                if child.is_empty() {
                    self.statics.remove(s);
                }
                removed
            }
            Segment::Param { constraint, .. } => {
                let idx = self.params.iter().position(|(c, _)| c == constraint)?;
                let removed = self.params[idx].1.remove(rest, method);
                if self.params[idx].1.is_empty() {
                    self.params.remove(idx);
                }
                removed
            }
            Segment::Wildcard { .. } => {
                let child = self.wildcard.as_mut()?;
                let removed = child.remove(rest, method);
                if child.is_empty() {
                    self.wildcard = None;
                }
                removed
            }
        }
    }

    /// Depth-first search returning the first node accepted by `accept`
    fn search<'n, 'p>(
        &'n self,
        path: &'p str,
        spans: &[(usize, usize)],
        accept: &dyn Fn(&Self) -> bool,
        captures: &mut Vec<Capture<'p>>,
    ) -> Option<&'n Self> {
        let Some(((start, end), rest)) = spans.split_first() else {
            return accept(self).then_some(self);
        };
        let segment = &path[*start..*end];

        if let Some(child) = self.statics.get(segment) {
            if let Some(found) = child.search(path, rest, accept, captures) {
                return Some(found);
            }
        }

        for (constraint, child) in &self.params {
            let Ok(value) = constraint.check(segment) else {
                continue;
            };
            captures.push((segment, value));
            if let Some(found) = child.search(path, rest, accept, captures) {
                return Some(found);
            }
            captures.pop();
        }

        if let Some(child) = self.wildcard.as_deref() {
            if accept(child) {
                let remainder = &path[*start..];
                captures.push((remainder, ParamValue::Path(remainder.to_string())));
                return Some(child);
            }
        }

        None
    }

    /// Union of the methods of every node matching the path
    fn collect_methods(&self, path: &str, spans: &[(usize, usize)], out: &mut BTreeSet<Method>) {
        let Some(((start, end), rest)) = spans.split_first() else {
            out.extend(self.endpoints.keys().copied());
            return;
        };
        let segment = &path[*start..*end];

        if let Some(child) = self.statics.get(segment) {
            child.collect_methods(path, rest, out);
        }
        for (constraint, child) in &self.params {
            if constraint.check(segment).is_ok() {
                child.collect_methods(path, rest, out);
            }
        }
        if let Some(child) = self.wildcard.as_deref() {
            out.extend(child.endpoints.keys().copied());
        }
    }

    /// First parameter child accepting any non-empty segment
    fn catch_all(&self) -> Option<&Self> {
        self.params
            .iter()
            .find(|(c, _)| !c.is_typed())
            .map(|(_, child)| child)
    }

    fn collect_shadowed(&self, out: &mut Vec<Shadowed>) {
        if let Some(first) = self.params.iter().position(|(c, _)| !c.is_typed()) {
            let winner = &self.params[first].1;
            for (_, later) in &self.params[first + 1..] {
                later.collect_covered(winner, out);
            }
        }
        for child in self.statics.values() {
            child.collect_shadowed(out);
        }
        for (_, child) in &self.params {
            child.collect_shadowed(out);
        }
        if let Some(child) = self.wildcard.as_deref() {
            child.collect_shadowed(out);
        }
    }

    /// Walk `self` alongside `winner`, which is tried first for every path
    /// reaching `self`, and report terminals `winner` answers for as well
    fn collect_covered(&self, winner: &Self, out: &mut Vec<Shadowed>) {
        for (method, endpoint) in &self.endpoints {
            if let Some(win) = winner.endpoints.get(method) {
                out.push(Shadowed {
                    method: *method,
                    route: endpoint.route,
                    by: win.route,
                });
            }
        }
        for (literal, child) in &self.statics {
            if let Some(w) = winner.statics.get(literal) {
                child.collect_covered(w, out);
            }
            if let Some(w) = winner.catch_all() {
                child.collect_covered(w, out);
            }
        }
        for (constraint, child) in &self.params {
            if let Some((_, w)) = winner.params.iter().find(|(c, _)| c == constraint) {
                child.collect_covered(w, out);
            }
            if constraint.is_typed() {
                if let Some(w) = winner.catch_all() {
                    child.collect_covered(w, out);
                }
            }
        }
        if let (Some(child), Some(w)) = (self.wildcard.as_deref(), winner.wildcard.as_deref()) {
            child.collect_covered(w, out);
        }
    }

    fn collect_static_paths(&self, prefix: &str, out: &mut BTreeSet<String>) {
        if !self.endpoints.is_empty() {
            out.insert(if prefix.is_empty() { "/".to_string() } else { prefix.to_string() });
        }
        for (literal, child) in &self.statics {
            child.collect_static_paths(&format!("{prefix}/{literal}"), out);
        }
    }
}

/// Route trie shared by all HTTP methods
#[derive(Debug, Default)]
pub struct Trie {
    root: Node,
    len: usize,
}

impl Trie {
    /// Create an empty trie
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (method, template) terminals
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no route is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Attach a route at the node described by `segments`
    ///
    /// Returns the id of the replaced route when `allow_override` is set and
    /// the slot was taken. No node is created when the insert fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRoute` if the slot is taken and overriding is
    /// not allowed.
    pub fn insert(
        &mut self,
        method: Method,
        template: &str,
        segments: &[Segment],
        route: RouteId,
        allow_override: bool,
    ) -> Result<Option<RouteId>> {
        let taken = self
            .root
            .find(segments)
            .is_some_and(|node| node.endpoints.contains_key(&method));
        if taken && !allow_override {
            return Err(Error::DuplicateRoute {
                method,
                template: template.to_string(),
            });
        }

        let endpoint = Endpoint {
            route,
            param_names: segments
                .iter()
                .filter_map(Segment::param_name)
                .map(str::to_string)
                .collect(),
        };
        let node = self.root.find_or_create(segments);
        let replaced = node.endpoints.insert(method, endpoint).map(|e| e.route);
        if replaced.is_none() {
            self.len += 1;
        }
        Ok(replaced)
    }

    /// Route registered for `method` exactly at `segments`
    #[must_use]
    pub fn get(&self, method: Method, segments: &[Segment]) -> Option<RouteId> {
        self.root
            .find(segments)
            .and_then(|node| node.endpoints.get(&method))
            .map(|e| e.route)
    }

    /// Terminals made unreachable by parameter declaration order
    #[must_use]
    pub fn shadowed(&self) -> Vec<Shadowed> {
        let mut out = Vec::new();
        self.root.collect_shadowed(&mut out);
        out.sort();
        out.dedup_by(|a, b| a.method == b.method && a.route == b.route);
        out
    }

    /// Detach the route for `method` at `segments`, pruning empty nodes
    pub fn remove(&mut self, method: Method, segments: &[Segment]) -> Option<RouteId> {
        let removed = self.root.remove(segments, method).map(|e| e.route);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Resolve a request path for a method
    #[must_use]
    pub fn lookup<'t, 'p>(&'t self, method: Method, path: &'p str) -> Lookup<'p>
    where
        't: 'p,
    {
        let spans = split_spans(path);
        let mut captures = Vec::with_capacity(spans.len());
        let accept = |node: &Node| node.endpoints.contains_key(&method);

        if let Some(node) = self.root.search(path, &spans, &accept, &mut captures) {
            if let Some(endpoint) = node.endpoints.get(&method) {
                let params = endpoint
                    .param_names
                    .iter()
                    .zip(captures)
                    .map(|(name, (raw, value))| RawParam {
                        name: name.as_str(),
                        raw,
                        value,
                    })
                    .collect();
                return Lookup::Found {
                    route: endpoint.route,
                    params,
                };
            }
        }

        let mut allowed = BTreeSet::new();
        self.root.collect_methods(path, &spans, &mut allowed);
        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allowed.into_iter().collect())
        }
    }

    /// Whether any method is registered for a matching node
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        let spans = split_spans(path);
        let mut allowed = BTreeSet::new();
        self.root.collect_methods(path, &spans, &mut allowed);
        !allowed.is_empty()
    }

    /// All registered parameter-free paths, sorted
    #[must_use]
    pub fn static_paths(&self) -> Vec<String> {
        let mut out = BTreeSet::new();
        self.root.collect_static_paths("", &mut out);
        out.into_iter().collect()
    }

    /// Closest registered static paths to `path`
    ///
    /// Candidates farther than `max_distance` edits (default: half the query
    /// length, at least 2) are dropped. Ordered by distance, then
    /// lexicographically.
    #[must_use]
    pub fn suggest(&self, path: &str, limit: usize, max_distance: Option<usize>) -> Vec<String> {
        if limit == 0 {
            return Vec::new();
        }
        closest_paths(&self.static_paths(), path, limit, max_distance)
    }
}

/// Rank `candidates` by edit distance to `path`, see [`Trie::suggest`]
#[must_use]
pub fn closest_paths(
    candidates: &[String],
    path: &str,
    limit: usize,
    max_distance: Option<usize>,
) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }
    let bound = max_distance.unwrap_or_else(|| (path.chars().count() / 2).max(2));

    let mut scored: Vec<(usize, &String)> = candidates
        .iter()
        .filter(|candidate| candidate.as_str() != path)
        .map(|candidate| (edit_distance(path, candidate), candidate))
        .filter(|(distance, _)| *distance <= bound)
        .collect();
    scored.sort();
    scored.truncate(limit);
    scored.into_iter().map(|(_, candidate)| candidate.clone()).collect()
}

/// Byte spans of each segment of `path` (leading `/` excluded)
fn split_spans(path: &str) -> Vec<(usize, usize)> {
    let body = path.strip_prefix('/').unwrap_or(path);
    if body.is_empty() {
        return Vec::new();
    }
    let offset = path.len() - body.len();
    let mut spans = Vec::new();
    let mut start = offset;
    for (i, b) in body.bytes().enumerate() {
        if b == b'/' {
            spans.push((start, offset + i));
            start = offset + i + 1;
        }
    }
    spans.push((start, path.len()));
    spans
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PathTemplate;
    use crate::types::ParamTypes;

    fn segments(t: &str) -> Vec<Segment> {
        PathTemplate::parse(t, &ParamTypes::new())
            .unwrap()
            .segments()
            .to_vec()
    }

    fn insert(trie: &mut Trie, method: Method, t: &str, id: RouteId) {
        trie.insert(method, t, &segments(t), id, false).unwrap();
    }

    fn found(lookup: &Lookup<'_>) -> Option<RouteId> {
        match lookup {
            Lookup::Found { route, .. } => Some(*route),
            _ => None,
        }
    }

    #[test]
    fn test_split_spans() {
        assert!(split_spans("/").is_empty());
        assert!(split_spans("").is_empty());
        let path = "/a/bc/";
        let spans = split_spans(path);
        let parts: Vec<&str> = spans.iter().map(|(s, e)| &path[*s..*e]).collect();
        assert_eq!(parts, vec!["a", "bc", ""]);
    }

    #[test]
    fn test_static_beats_param_regardless_of_order() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{id}", 0);
        insert(&mut trie, Method::Get, "/user/profile", 1);

        assert_eq!(found(&trie.lookup(Method::Get, "/user/profile")), Some(1));
        assert_eq!(found(&trie.lookup(Method::Get, "/user/42")), Some(0));
    }

    #[test]
    fn test_typed_param_then_wildcard() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{rest:path}", 0);
        insert(&mut trie, Method::Get, "/user/{id:uint}", 1);

        assert_eq!(found(&trie.lookup(Method::Get, "/user/42")), Some(1));
        match trie.lookup(Method::Get, "/user/abc/def") {
            Lookup::Found { route, params } => {
                assert_eq!(route, 0);
                assert_eq!(params[0].name, "rest");
                assert_eq!(params[0].raw, "abc/def");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_backtracks_out_of_static_branch() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/hello/{p:path}", 0);
        insert(&mut trie, Method::Get, "/hello/{p1}/static/{p2}", 1);
        insert(&mut trie, Method::Get, "/hello/static/other", 2);

        assert_eq!(found(&trie.lookup(Method::Get, "/hello/x/static/y")), Some(1));
        assert_eq!(found(&trie.lookup(Method::Get, "/hello/x")), Some(0));
        assert_eq!(found(&trie.lookup(Method::Get, "/hello/static/y")), Some(0));
        assert_eq!(found(&trie.lookup(Method::Get, "/hello/static/other")), Some(2));
    }

    #[test]
    fn test_param_siblings_in_declaration_order() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{id:uint}", 0);
        insert(&mut trie, Method::Get, "/user/{name:alphabetical}", 1);
        insert(&mut trie, Method::Get, "/user/{any}", 2);

        assert_eq!(found(&trie.lookup(Method::Get, "/user/7")), Some(0));
        assert_eq!(found(&trie.lookup(Method::Get, "/user/bob")), Some(1));
        assert_eq!(found(&trie.lookup(Method::Get, "/user/b0b")), Some(2));
    }

    #[test]
    fn test_constraint_violation_is_not_found() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{id:uint}", 0);
        assert_eq!(trie.lookup(Method::Get, "/user/abc"), Lookup::NotFound);
    }

    #[test]
    fn test_method_not_allowed() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Post, "/users", 0);
        insert(&mut trie, Method::Delete, "/users/{id}", 1);
        insert(&mut trie, Method::Put, "/users", 2);

        assert_eq!(
            trie.lookup(Method::Get, "/users"),
            Lookup::MethodNotAllowed(vec![Method::Post, Method::Put])
        );
        assert_eq!(trie.lookup(Method::Get, "/nope"), Lookup::NotFound);
    }

    #[test]
    fn test_duplicate_and_override() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{id}", 0);
        let segs = segments("/user/{name}");
        let err = trie
            .insert(Method::Get, "/user/{name}", &segs, 1, false)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { .. }));

        let replaced = trie
            .insert(Method::Get, "/user/{name}", &segs, 1, true)
            .unwrap();
        assert_eq!(replaced, Some(0));
        assert_eq!(trie.len(), 1);
        match trie.lookup(Method::Get, "/user/x") {
            Lookup::Found { route, params } => {
                assert_eq!(route, 1);
                assert_eq!(params[0].name, "name");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_remove_prunes_nodes() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/a/b/c", 0);
        insert(&mut trie, Method::Get, "/a", 1);

        assert_eq!(trie.remove(Method::Get, &segments("/a/b/c")), Some(0));
        assert!(trie.root.statics["a"].statics.is_empty());
        assert_eq!(trie.remove(Method::Get, &segments("/a")), Some(1));
        assert!(trie.root.is_empty());
        assert!(trie.is_empty());
        assert_eq!(trie.remove(Method::Get, &segments("/a")), None);
    }

    #[test]
    fn test_get_exact_slot() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{id:uint}", 4);
        assert_eq!(trie.get(Method::Get, &segments("/user/{n:uint}")), Some(4));
        assert_eq!(trie.get(Method::Post, &segments("/user/{id:uint}")), None);
        assert_eq!(trie.get(Method::Get, &segments("/user/{id}")), None);
    }

    #[test]
    fn test_shadowed_param_sibling() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{name}", 0);
        insert(&mut trie, Method::Get, "/user/{id:uint}", 1);
        insert(&mut trie, Method::Post, "/user/{id:uint}", 2);

        assert_eq!(
            trie.shadowed(),
            vec![Shadowed {
                method: Method::Get,
                route: 1,
                by: 0
            }]
        );
        assert_eq!(found(&trie.lookup(Method::Get, "/user/42")), Some(0));
    }

    #[test]
    fn test_shadowed_below_param_sibling() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{name}/posts", 0);
        insert(&mut trie, Method::Get, "/user/{id:uint}/posts", 1);
        insert(&mut trie, Method::Get, "/user/{id:uint}/avatar", 2);
        insert(&mut trie, Method::Get, "/user/{name}/{tab}", 3);
        insert(&mut trie, Method::Get, "/user/{id:uint}/{n:uint}", 4);

        assert_eq!(
            trie.shadowed(),
            vec![
                Shadowed {
                    method: Method::Get,
                    route: 1,
                    by: 0
                },
                Shadowed {
                    method: Method::Get,
                    route: 2,
                    by: 3
                },
                Shadowed {
                    method: Method::Get,
                    route: 4,
                    by: 3
                },
            ]
        );
        assert_eq!(found(&trie.lookup(Method::Get, "/user/5/posts")), Some(0));
    }

    #[test]
    fn test_distinct_suffix_is_not_shadowed() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{name}/posts", 0);
        insert(&mut trie, Method::Get, "/user/{id:uint}/avatar", 1);
        insert(&mut trie, Method::Post, "/user/{id:uint}/posts", 2);
        assert!(trie.shadowed().is_empty());
        assert_eq!(found(&trie.lookup(Method::Get, "/user/5/avatar")), Some(1));
    }

    #[test]
    fn test_typed_first_is_not_shadowed() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/user/{id:uint}", 0);
        insert(&mut trie, Method::Get, "/user/{name}", 1);
        assert!(trie.shadowed().is_empty());
    }

    #[test]
    fn test_root_route() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/", 0);
        assert_eq!(found(&trie.lookup(Method::Get, "/")), Some(0));
        assert_eq!(found(&trie.lookup(Method::Get, "")), Some(0));
    }

    #[test]
    fn test_suggest() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/home", 0);
        insert(&mut trie, Method::Get, "/contact", 1);
        insert(&mut trie, Method::Get, "/contract", 2);
        insert(&mut trie, Method::Get, "/user/{id}", 3);

        assert_eq!(trie.suggest("/hom", 3, None), vec!["/home".to_string()]);
        assert_eq!(
            trie.suggest("/contac", 3, None),
            vec!["/contact".to_string(), "/contract".to_string()]
        );
        assert!(trie.suggest("/hom", 0, None).is_empty());
        assert_eq!(trie.static_paths(), vec!["/contact", "/contract", "/home"]);
    }

    #[test]
    fn test_suggest_ties_are_lexicographic() {
        let mut trie = Trie::new();
        insert(&mut trie, Method::Get, "/cat", 0);
        insert(&mut trie, Method::Get, "/bat", 1);
        insert(&mut trie, Method::Get, "/at/home", 2);

        assert_eq!(
            trie.suggest("/at", 3, None),
            vec!["/bat".to_string(), "/cat".to_string()]
        );
        assert_eq!(trie.suggest("/at", 1, None), vec!["/bat".to_string()]);
    }

    #[test]
    fn test_closest_paths_over_cached_candidates() {
        let candidates = vec!["/users".to_string(), "/posts".to_string(), "/user".to_string()];
        assert_eq!(
            closest_paths(&candidates, "/usrs", 3, None),
            vec!["/users".to_string(), "/user".to_string()]
        );
        assert_eq!(closest_paths(&candidates, "/user", 3, Some(0)), Vec::<String>::new());
        assert!(closest_paths(&candidates, "/usrs", 0, None).is_empty());
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("/hom", "/home"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }
}
