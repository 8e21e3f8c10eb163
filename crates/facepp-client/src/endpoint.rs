//! The endpoint registry and typed traversal over it.

use once_cell::sync::Lazy;

use crate::client::Api;
use crate::error::ApiError;
use crate::params::Params;
use crate::response::ApiResponse;

/// Every endpoint path the Face++ v3 API exposes. The list makes no
/// claim about the provider's actual capabilities; it is kept in sync
/// by hand.
const ENDPOINT_PATHS: &[&str] = &[
    "/detect",
    "/compare",
    "/search",
    "/faceset/create",
    "/faceset/addface",
    "/faceset/removeface",
    "/faceset/update",
    "/faceset/getdetail",
    "/faceset/delete",
    "/faceset/getfacesets",
    "/face/analyze",
    "/face/getdetail",
    "/face/setuserid",
];

/// Paths pre-split into segment sequences; the empty segment from the
/// leading slash is discarded.
static REGISTRY: Lazy<Vec<Vec<&'static str>>> = Lazy::new(|| {
    ENDPOINT_PATHS
        .iter()
        .map(|p| p.split('/').filter(|s| !s.is_empty()).collect())
        .collect()
});

pub(crate) fn registry() -> &'static [Vec<&'static str>] {
    &REGISTRY
}

/// A position in the endpoint tree: a segment prefix plus the URL a
/// call at that position would POST to.
///
/// Nodes are cheap and never cached; traversal recomputes children
/// from the registry each time.
#[derive(Debug, Clone)]
pub struct Endpoint<'a> {
    api: &'a Api,
    prefix: Vec<&'static str>,
    url: String,
}

impl<'a> Endpoint<'a> {
    pub(crate) fn new(api: &'a Api, prefix: Vec<&'static str>) -> Self {
        let url = format!("{}{}", api.config().server, prefix.join("/"));
        Self { api, prefix, url }
    }

    /// The materialized URL for this node.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path segments from the root to this node.
    pub fn path(&self) -> &[&'static str] {
        &self.prefix
    }

    /// Distinct next segments registered below this prefix, in
    /// registry order, deduplicated by name.
    pub fn children(&self) -> Vec<&'static str> {
        let lvl = self.prefix.len();
        let mut seen: Vec<&'static str> = Vec::new();
        for path in registry() {
            if path.len() <= lvl || path[..lvl] != self.prefix[..] {
                continue;
            }
            if !seen.contains(&path[lvl]) {
                seen.push(path[lvl]);
            }
        }
        seen
    }

    /// Step one segment deeper, if the registry extends this prefix
    /// by `name`.
    pub fn child(&self, name: &str) -> Option<Endpoint<'a>> {
        let lvl = self.prefix.len();
        registry().iter().find_map(|path| {
            if path.len() > lvl && path[..lvl] == self.prefix[..] && path[lvl] == name {
                let mut prefix = self.prefix.clone();
                prefix.push(path[lvl]);
                Some(Endpoint::new(self.api, prefix))
            } else {
                None
            }
        })
    }

    /// POST to this node's URL with the given parameters.
    ///
    /// Calling at a prefix that is not a full registered endpoint is
    /// not rejected; the POST simply goes to the incomplete URL and
    /// the server will refuse it.
    pub fn call(&self, params: Params) -> Result<ApiResponse, ApiError> {
        self.api.invoke(&self.url, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_api() -> Api {
        Api::builder("key", "secret")
            .server("https://api.example.com/facepp/v3/")
            .build()
            .unwrap()
    }

    #[test]
    fn registry_splits_paths_without_empty_segments() {
        let registry = registry();
        assert_eq!(registry.len(), ENDPOINT_PATHS.len());
        assert!(registry.contains(&vec!["detect"]));
        assert!(registry.contains(&vec!["faceset", "create"]));
        for path in registry {
            assert!(!path.is_empty());
            assert!(path.iter().all(|s| !s.is_empty()));
        }
    }

    #[test]
    fn traversal_materializes_url_for_every_registered_path() {
        let api = test_api();
        for path in registry() {
            let mut node = api.root();
            for segment in path {
                node = node.child(segment).unwrap();
            }
            let expected = format!("https://api.example.com/facepp/v3/{}", path.join("/"));
            assert_eq!(node.url(), expected);
            assert_eq!(node.path(), &path[..]);
        }
    }

    #[test]
    fn children_are_deduplicated_by_name() {
        let api = test_api();
        let root = api.root();
        let children = root.children();

        // Seven faceset endpoints collapse into a single child.
        assert_eq!(
            children,
            vec!["detect", "compare", "search", "faceset", "face"]
        );

        let faceset = root.child("faceset").unwrap();
        assert_eq!(
            faceset.children(),
            vec![
                "create",
                "addface",
                "removeface",
                "update",
                "getdetail",
                "delete",
                "getfacesets"
            ]
        );
    }

    #[test]
    fn unknown_segment_has_no_child() {
        let api = test_api();
        assert!(api.root().child("bodies").is_none());
        assert!(api
            .root()
            .child("faceset")
            .unwrap()
            .child("detect")
            .is_none());
    }

    #[test]
    fn leaf_has_no_children() {
        let api = test_api();
        let detect = api.root().child("detect").unwrap();
        assert!(detect.children().is_empty());
    }

    #[test]
    fn retraversal_yields_equivalent_nodes() {
        let api = test_api();
        let first = api.root().child("faceset").unwrap();
        let second = api.root().child("faceset").unwrap();
        assert_eq!(first.url(), second.url());
        assert_eq!(first.path(), second.path());
    }
}
