//! Property-based tests for module-graph traversal.
//!
//! Generates arbitrary `@forward` graphs over a fixed set of modules, cycles
//! included, and checks that traversal terminates with each module visited
//! once and that forwarded members resolve exactly when they are reachable.
#![cfg(feature = "proptest")]

use std::sync::Arc;

use proptest::prelude::*;
use rustc_hash::FxHashSet;
use sassy::hir::TraversalOptions;
use sassy::ide::{AnalysisHost, GotoTarget};
use sassy::project::MemoryFileSystem;
use sassy::TextSize;

const MODULES: usize = 5;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Adjacency matrix of `@forward` edges, row-major.
fn arb_edges() -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(any::<bool>(), MODULES * MODULES)
}

fn module_uri(i: usize) -> String {
    format!("file:///p/m{i}.scss")
}

fn build(edges: &[bool]) -> (AnalysisHost, String) {
    let fs = MemoryFileSystem::new();
    for i in 0..MODULES {
        let mut text = String::new();
        for j in 0..MODULES {
            if i != j && edges[i * MODULES + j] {
                text.push_str(&format!("@forward \"m{j}\";\n"));
            }
        }
        text.push_str(&format!("$v{i}: {i};\n"));
        fs.insert(&module_uri(i), text);
    }

    let mut main = String::from("@use \"m0\";\n.a {");
    for i in 0..MODULES {
        main.push_str(&format!(" p{i}: m0.$v{i};"));
    }
    main.push_str(" }");
    fs.insert("file:///p/main.scss", main.clone());

    (AnalysisHost::new(Arc::new(fs)), main)
}

fn reachable_from_first(edges: &[bool]) -> FxHashSet<usize> {
    let mut seen = FxHashSet::default();
    let mut stack = vec![0];
    while let Some(i) = stack.pop() {
        if !seen.insert(i) {
            continue;
        }
        for j in 0..MODULES {
            if edges[i * MODULES + j] {
                stack.push(j);
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn traversal_visits_each_module_once(edges in arb_edges()) {
        let (host, _) = build(&edges);
        let analysis = host.analysis();
        let graph = analysis.graph();
        let main = analysis.document("file:///p/main.scss").unwrap();

        let visited = graph.traverse(&main, TraversalOptions::exhaustive(), |module, _| vec![module.uri()]);
        let unique: FxHashSet<_> = visited.iter().cloned().collect();
        prop_assert_eq!(unique.len(), visited.len());
        // main plus everything forwarded from m0
        prop_assert_eq!(visited.len(), reachable_from_first(&edges).len() + 1);
    }

    #[test]
    fn forwarded_members_resolve_iff_reachable(edges in arb_edges()) {
        let (host, main) = build(&edges);
        let reachable = reachable_from_first(&edges);
        let analysis = host.analysis();
        let entry = analysis.document("file:///p/main.scss").unwrap();

        for i in 0..MODULES {
            let needle = format!("m0.$v{i};");
            let offset = main.find(&needle).unwrap() as u32 + 4;
            let position = entry.document().position_at(TextSize::from(offset));
            let target = analysis
                .goto_definition("file:///p/main.scss", position)
                .map(|result| result.target);
            match target {
                Some(GotoTarget::Declaration(location)) => {
                    prop_assert!(reachable.contains(&i));
                    let expected_uri = module_uri(i);
                    prop_assert_eq!(&*location.uri, expected_uri.as_str());
                }
                None => prop_assert!(!reachable.contains(&i)),
                Some(other) => prop_assert!(false, "unexpected target {:?}", other),
            }
        }
    }
}
