//! Property tests for emission ordering invariants

use cres_rs::codegen::{EmissionPlan, Emitter};
use cres_rs::ResourceTree;
use proptest::prelude::*;

/// Random folder paths, depth at most 6, at most 5 distinct names per level
fn folder_paths() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d", "e"]), 1..=6)
            .prop_map(|segments| segments.join("/")),
        0..16,
    )
}

/// File placements: (folder pick, file name pick)
fn file_picks() -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((any::<usize>(), 0u8..5), 0..24)
}

/// Build a tree from generated paths and file placements
fn build_tree(paths: &[String], picks: &[(usize, u8)]) -> ResourceTree {
    let mut tree = ResourceTree::new();
    for path in paths {
        tree.ensure_folder(path);
    }

    // Snapshot all folder paths (root included) so picks index a stable list
    let plan = EmissionPlan::build(&tree);
    let folder_paths: Vec<String> = plan
        .folders_preorder
        .iter()
        .map(|&id| tree.folder(id).path.clone())
        .collect();

    for &(pick, name_pick) in picks {
        let folder = if folder_paths[pick % folder_paths.len()].is_empty() {
            tree.root()
        } else {
            tree.find_folder(&folder_paths[pick % folder_paths.len()])
                .unwrap()
        };
        let name = format!("f{}.txt", name_pick);
        // Duplicate names within a folder are rejected; that is fine here
        if let Ok(file) = tree.add_file(folder, &name, None) {
            tree.file_mut(file).data = Some(vec![name_pick; usize::from(name_pick) + 1]);
        }
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_postorder_defines_children_before_parents(
        paths in folder_paths(),
        picks in file_picks(),
    ) {
        let tree = build_tree(&paths, &picks);
        let plan = EmissionPlan::build(&tree);

        prop_assert_eq!(plan.folders_postorder.len(), plan.folders_preorder.len());
        prop_assert_eq!(*plan.folders_postorder.last().unwrap(), tree.root());

        let pos = |id| plan.folders_postorder.iter().position(|&f| f == id).unwrap();
        for &folder in &plan.folders_preorder {
            if let Some(parent) = tree.folder(folder).parent {
                prop_assert!(pos(folder) < pos(parent));
            }
        }
    }

    #[test]
    fn prop_data_indices_are_dense_and_folder_contiguous(
        paths in folder_paths(),
        picks in file_picks(),
    ) {
        let tree = build_tree(&paths, &picks);
        let plan = EmissionPlan::build(&tree);

        // Every file gets exactly one index, 0..file_count
        prop_assert_eq!(plan.data_order.len(), tree.file_count());
        for (i, &file) in plan.data_order.iter().enumerate() {
            prop_assert_eq!(plan.data_index(file), Some(i));
        }

        // A folder's files occupy a contiguous index run starting at
        // files_start, in declaration order
        for &folder in &plan.folders_preorder {
            let stats = plan.folder_stats(folder).unwrap();
            let node = tree.folder(folder);
            prop_assert_eq!(stats.file_count, node.files.len());
            for (slot, &file) in node.files.iter().enumerate() {
                prop_assert_eq!(plan.data_index(file), Some(stats.files_start + slot));
            }
        }
    }

    #[test]
    fn prop_emitted_records_reference_their_own_data(
        paths in folder_paths(),
        picks in file_picks(),
    ) {
        let tree = build_tree(&paths, &picks);
        let plan = EmissionPlan::build(&tree);

        let mut emitter = Emitter::new(&tree, "res");
        let mut header = Vec::new();
        let mut source = Vec::new();
        emitter.write_header(&mut header).unwrap();
        emitter.write_source(&mut source, "res.h").unwrap();
        let source = String::from_utf8(source).unwrap();

        for &file in &plan.data_order {
            let node = tree.file(file);
            let index = plan.data_index(file).unwrap();

            // The record block for this path names its own data array
            let marker = format!(".path = \"{}\",", node.path);
            let record_at = source.find(&marker).unwrap();
            let record = &source[record_at..record_at + 200.min(source.len() - record_at)];
            let data_marker = format!(".data = res_data_{},", index);
            let size_marker = format!(".size = {},", node.size());
            prop_assert!(record.contains(&data_marker));
            prop_assert!(record.contains(&size_marker));
        }
    }
}
