//! Artifact emission
//!
//! Renders a planned tree as two C artifacts: a header declaring every
//! exposed symbol, and a source file defining the statically-allocated
//! records. The tree's reference graph is cyclic (parent <-> children,
//! file <-> folder), so the source follows a strict declare-then-define
//! sequence:
//!
//! 1. byte arrays, in data-index order (empty files are skipped)
//! 2. tentative definitions for every non-root folder, establishing each
//!    folder's address before any value is known
//! 3. metadata arrays, in metadata-index order
//! 4. per-folder file record arrays plus one exposed alias per file
//! 5. folder definitions in post-order, root last
//!
//! Addresses taken in steps 4 and 5 are valid because of step 2; values
//! referenced by count (children, files) are complete because of the
//! post-order in step 5.

use crate::codegen::plan::{EmissionPlan, MetaOwner};
use crate::codegen::symbols::{sanitize, SymbolRegistry};
use crate::codegen::writer::SourceWriter;
use crate::error::{CresError, Result};
use crate::tree::{FileId, FolderId, MetadataEntry, ResourceTree};
use std::io::Write;

/// Bytes per row in emitted data arrays
const HEX_BYTES_PER_LINE: usize = 12;

/// Single-use emitter for one tree
pub struct Emitter<'a> {
    tree: &'a ResourceTree,
    name: &'a str,
    plan: EmissionPlan,
    registry: SymbolRegistry,
}

impl<'a> Emitter<'a> {
    pub fn new(tree: &'a ResourceTree, name: &'a str) -> Self {
        Self {
            tree,
            name,
            plan: EmissionPlan::build(tree),
            registry: SymbolRegistry::new(name),
        }
    }

    /// Write the declarations artifact (header)
    pub fn write_header<W: Write>(&mut self, sink: W) -> Result<()> {
        let mut w = SourceWriter::new(sink);
        let guard = format!("{}_H", sanitize(self.name).to_ascii_uppercase());

        w.line(&format!("#ifndef {}", guard))?;
        w.line(&format!("#define {}", guard))?;
        w.newline()?;
        w.line("#include <cres/types.h>")?;
        w.newline()?;

        let root = self.registry.dir_symbol("")?;
        w.line(&format!("extern const cres_folder_t {};", root))?;

        for &folder in &self.plan.folders_preorder {
            if folder == self.tree.root() {
                continue;
            }
            let sym = self.registry.dir_symbol(&self.tree.folder(folder).path)?;
            w.line(&format!("extern const cres_folder_t {};", sym))?;
        }
        w.newline()?;

        for &file in &self.plan.data_order {
            let sym = self.registry.file_symbol(&self.tree.file(file).path)?;
            w.line(&format!("extern const cres_file_t * const {};", sym))?;
        }

        w.newline()?;
        w.line(&format!("#endif /* {} */", guard))?;
        w.flush()
    }

    /// Write the definitions artifact (source), importing `header_name`
    pub fn write_source<W: Write>(&mut self, sink: W, header_name: &str) -> Result<()> {
        let mut w = SourceWriter::new(sink);

        w.line(&format!("#include \"{}\"", header_name))?;
        w.newline()?;

        self.emit_data_arrays(&mut w)?;
        self.emit_forward_decls(&mut w)?;
        self.emit_metadata_arrays(&mut w)?;
        self.emit_file_arrays(&mut w)?;
        self.emit_folder_defs(&mut w)?;

        w.flush()
    }

    /// Step 1: one byte array per non-empty file, data-index order
    fn emit_data_arrays<W: Write>(&mut self, w: &mut SourceWriter<W>) -> Result<()> {
        for (index, &file) in self.plan.data_order.iter().enumerate() {
            let node = self.tree.file(file);
            let Some(data) = node.data.as_deref().filter(|d| !d.is_empty()) else {
                continue;
            };

            w.line(&format!(
                "static const unsigned char {}_data_{}[] = {{",
                self.name, index
            ))?;
            w.indent();
            w.hex_bytes(data, HEX_BYTES_PER_LINE)?;
            w.newline()?;
            w.dedent();
            w.line("};")?;
            w.newline()?;
        }
        Ok(())
    }

    /// Step 2: tentative definitions break the parent/child cycle
    fn emit_forward_decls<W: Write>(&mut self, w: &mut SourceWriter<W>) -> Result<()> {
        for &folder in &self.plan.folders_preorder {
            if folder == self.tree.root() {
                continue;
            }
            let sym = self.registry.dir_symbol(&self.tree.folder(folder).path)?;
            w.line(&format!("const cres_folder_t {};", sym))?;
        }
        w.newline()
    }

    /// Step 3: every metadata block, metadata-index order
    fn emit_metadata_arrays<W: Write>(&mut self, w: &mut SourceWriter<W>) -> Result<()> {
        let meta_order = self.plan.meta_order.clone();
        for (index, owner) in meta_order.into_iter().enumerate() {
            let entries = match owner {
                MetaOwner::Folder(id) => &self.tree.folder(id).metadata,
                MetaOwner::File(id) => &self.tree.file(id).metadata,
            };
            self.emit_metadata_block(w, index, entries)?;
        }
        Ok(())
    }

    fn emit_metadata_block<W: Write>(
        &self,
        w: &mut SourceWriter<W>,
        index: usize,
        entries: &[MetadataEntry],
    ) -> Result<()> {
        w.line(&format!(
            "static const cres_metadata_t {}_meta_{}[] = {{",
            self.name, index
        ))?;
        w.indent();
        for (i, entry) in entries.iter().enumerate() {
            w.write("{ ")?;
            w.c_string(&entry.key)?;
            w.write(", ")?;
            w.c_string(&entry.value)?;
            w.write(" }")?;
            if i + 1 < entries.len() {
                w.write(",")?;
            }
            w.newline()?;
        }
        w.dedent();
        w.line("};")?;
        w.newline()
    }

    /// Step 4: per-folder file record arrays and exposed aliases
    fn emit_file_arrays<W: Write>(&mut self, w: &mut SourceWriter<W>) -> Result<()> {
        let mut running_index = 0usize;
        let folders = self.plan.folders_preorder.clone();

        for folder in folders {
            let stats = self.plan.folder_stats(folder).ok_or_else(|| {
                CresError::Internal(format!("missing plan stats for folder {:?}", folder))
            })?;
            if stats.file_count == 0 {
                continue;
            }
            if running_index > stats.files_start {
                return Err(CresError::Internal(
                    "file array emission ran ahead of planned data indices".to_string(),
                ));
            }
            running_index = stats.files_start;

            let dir_sym = self.registry.dir_symbol(&self.tree.folder(folder).path)?;
            w.line(&format!(
                "static const cres_file_t {}_files[] = {{",
                dir_sym
            ))?;
            w.indent();

            let files = self.tree.folder(folder).files.clone();
            for (slot, &file) in files.iter().enumerate() {
                let data_index = stats.files_start + slot;
                if self.plan.data_index(file) != Some(data_index) {
                    return Err(CresError::Internal(format!(
                        "data index mismatch for '{}'",
                        self.tree.file(file).path
                    )));
                }
                self.emit_file_record(w, file, data_index, &dir_sym)?;
                if slot + 1 < files.len() {
                    w.write(",")?;
                }
                w.newline()?;
                running_index += 1;
            }

            w.dedent();
            w.line("};")?;
            w.newline()?;

            for (slot, &file) in files.iter().enumerate() {
                let file_sym = self.registry.file_symbol(&self.tree.file(file).path)?;
                w.line(&format!(
                    "const cres_file_t * const {} = &{}_files[{}];",
                    file_sym, dir_sym, slot
                ))?;
            }
            w.newline()?;
        }
        Ok(())
    }

    fn emit_file_record<W: Write>(
        &self,
        w: &mut SourceWriter<W>,
        file: FileId,
        data_index: usize,
        dir_sym: &str,
    ) -> Result<()> {
        let node = self.tree.file(file);

        w.line("{")?;
        w.indent();

        w.write(".name = ")?;
        w.c_string(&node.name)?;
        w.line(",")?;

        w.write(".path = ")?;
        w.c_string(&node.path)?;
        w.line(",")?;

        w.write(".mime = ")?;
        w.c_string(&node.mime)?;
        w.line(",")?;

        if node.size() > 0 {
            w.line(&format!(".data = {}_data_{},", self.name, data_index))?;
        } else {
            w.line(".data = NULL,")?;
        }
        w.line(&format!(".size = {},", node.size()))?;
        w.line(&format!(".parent = &{},", dir_sym))?;

        match self.plan.file_meta_index(file) {
            Some(meta_index) => {
                w.line(&format!(".metadata = {}_meta_{},", self.name, meta_index))?;
                w.line(&format!(".metadata_count = {}", node.metadata.len()))?;
            }
            None => {
                w.line(".metadata = NULL,")?;
                w.line(".metadata_count = 0")?;
            }
        }

        w.dedent();
        w.write("}")
    }

    /// Step 5: folder definitions, children before parents, root last
    fn emit_folder_defs<W: Write>(&mut self, w: &mut SourceWriter<W>) -> Result<()> {
        let folders = self.plan.folders_postorder.clone();
        for folder in folders {
            self.emit_folder_def(w, folder)?;
        }
        Ok(())
    }

    fn emit_folder_def<W: Write>(
        &mut self,
        w: &mut SourceWriter<W>,
        folder: FolderId,
    ) -> Result<()> {
        let stats = self.plan.folder_stats(folder).ok_or_else(|| {
            CresError::Internal(format!("missing plan stats for folder {:?}", folder))
        })?;
        let node = self.tree.folder(folder);
        let self_sym = self.registry.dir_symbol(&node.path)?;

        w.line(&format!("const cres_folder_t {} = {{", self_sym))?;
        w.indent();

        w.write(".name = ")?;
        w.c_string(&node.name)?;
        w.line(",")?;

        w.write(".path = ")?;
        w.c_string(&node.path)?;
        w.line(",")?;

        match node.parent {
            Some(parent) => {
                let parent_sym = self.registry.dir_symbol(&self.tree.folder(parent).path)?;
                w.line(&format!(".parent = &{},", parent_sym))?;
            }
            None => w.line(".parent = NULL,")?,
        }

        match node.children.first() {
            Some(&first_child) => {
                let child_sym = self
                    .registry
                    .dir_symbol(&self.tree.folder(first_child).path)?;
                w.line(&format!(".children = &{},", child_sym))?;
                w.line(&format!(".child_count = {},", stats.child_count))?;
            }
            None => {
                w.line(".children = NULL,")?;
                w.line(".child_count = 0,")?;
            }
        }

        if stats.file_count > 0 {
            w.line(&format!(".files = {}_files,", self_sym))?;
            w.line(&format!(".file_count = {},", stats.file_count))?;
        } else {
            w.line(".files = NULL,")?;
            w.line(".file_count = 0,")?;
        }

        match self.plan.folder_meta_index(folder) {
            Some(meta_index) => {
                w.line(&format!(".metadata = {}_meta_{},", self.name, meta_index))?;
                w.line(&format!(".metadata_count = {}", node.metadata.len()))?;
            }
            None => {
                w.line(".metadata = NULL,")?;
                w.line(".metadata_count = 0")?;
            }
        }

        w.dedent();
        w.line("};")?;
        w.newline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tree: &ResourceTree, name: &str) -> (String, String) {
        let mut emitter = Emitter::new(tree, name);
        let mut header = Vec::new();
        let mut source = Vec::new();
        emitter.write_header(&mut header).unwrap();
        emitter.write_source(&mut source, "res.h").unwrap();
        (
            String::from_utf8(header).unwrap(),
            String::from_utf8(source).unwrap(),
        )
    }

    #[test]
    fn test_single_file_with_root_metadata() {
        // One root-level file "readme.txt" with content "hi" and one
        // metadata pair on the root.
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let file = tree.add_file(root, "readme.txt", None).unwrap();
        tree.file_mut(file).data = Some(b"hi".to_vec());
        tree.add_folder_metadata(root, "version", "1");

        let (header, source) = render(&tree, "res");

        // Header declares root and the file alias
        assert!(header.contains("#ifndef RES_H"));
        assert!(header.contains("#include <cres/types.h>"));
        assert!(header.contains("extern const cres_folder_t res_root;"));
        assert!(header.contains("extern const cres_file_t * const res_file_readme_txt;"));

        // One data array with the two content bytes
        assert!(source.contains("static const unsigned char res_data_0[] = {"));
        assert!(source.contains("0x68, 0x69"));

        // One metadata block with one entry
        assert!(source.contains("static const cres_metadata_t res_meta_0[] = {"));
        assert!(source.contains("{ \"version\", \"1\" }"));

        // File record references the array, size 2, no per-file metadata
        assert!(source.contains(".data = res_data_0,"));
        assert!(source.contains(".size = 2,"));
        assert!(source.contains(".parent = &res_root,"));
        assert!(source.contains(".metadata = NULL,"));

        // Exposed alias into the root's file array
        assert!(source.contains("const cres_file_t * const res_file_readme_txt = &res_root_files[0];"));

        // Root definition: no children, one file, one metadata entry
        assert!(source.contains("const cres_folder_t res_root = {"));
        assert!(source.contains(".children = NULL,"));
        assert!(source.contains(".child_count = 0,"));
        assert!(source.contains(".files = res_root_files,"));
        assert!(source.contains(".file_count = 1,"));
        assert!(source.contains(".metadata = res_meta_0,"));
        assert!(source.contains(".metadata_count = 1"));
    }

    #[test]
    fn test_empty_file_has_null_data() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let file = tree.add_file(root, "empty.txt", None).unwrap();
        tree.file_mut(file).data = Some(Vec::new());

        let (_, source) = render(&tree, "res");

        assert!(!source.contains("res_data_0"));
        assert!(source.contains(".data = NULL,"));
        assert!(source.contains(".size = 0,"));
    }

    #[test]
    fn test_data_indices_follow_preorder() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let sub = tree.ensure_folder("sub");

        let top = tree.add_file(root, "top.bin", None).unwrap();
        let nested = tree.add_file(sub, "nested.bin", None).unwrap();
        tree.file_mut(top).data = Some(vec![0xaa]);
        tree.file_mut(nested).data = Some(vec![0xbb]);

        let (_, source) = render(&tree, "res");

        // top.bin is data 0, nested.bin is data 1
        let top_pos = source.find(".data = res_data_0,").unwrap();
        let nested_pos = source.find(".data = res_data_1,").unwrap();
        assert!(top_pos < nested_pos);
        assert!(source[..source.find("res_data_1").unwrap()].contains("0xaa"));
    }

    #[test]
    fn test_forward_decls_precede_file_arrays() {
        let mut tree = ResourceTree::new();
        let sub = tree.ensure_folder("sub");
        let file = tree.add_file(sub, "a.txt", None).unwrap();
        tree.file_mut(file).data = Some(b"x".to_vec());

        let (_, source) = render(&tree, "res");

        let forward = source.find("const cres_folder_t res_dir_sub;").unwrap();
        let array = source.find("static const cres_file_t res_dir_sub_files[]").unwrap();
        let def = source.find("const cres_folder_t res_dir_sub = {").unwrap();
        assert!(forward < array);
        assert!(array < def);
    }

    #[test]
    fn test_folder_defs_postorder_root_last() {
        let mut tree = ResourceTree::new();
        tree.ensure_folder("a/inner");
        tree.ensure_folder("b");

        let (_, source) = render(&tree, "res");

        let def = |sym: &str| source.find(&format!("const cres_folder_t {} = {{", sym)).unwrap();
        assert!(def("res_dir_a_inner") < def("res_dir_a"));
        assert!(def("res_dir_a") < def("res_root"));
        assert!(def("res_dir_b") < def("res_root"));

        // Parent links into the forward-declared symbols
        assert!(source.contains(".parent = &res_dir_a,"));
        assert!(source.contains(".children = &res_dir_a,"));
    }

    #[test]
    fn test_symbol_collision_fails_emission() {
        let mut tree = ResourceTree::new();
        tree.ensure_folder("a-b");
        tree.ensure_folder("a_b");

        let mut emitter = Emitter::new(&tree, "res");
        let err = emitter.write_header(Vec::new()).unwrap_err();
        assert!(matches!(err, CresError::SymbolCollision { .. }));
    }

    #[test]
    fn test_string_escaping_in_records() {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        tree.add_folder_metadata(root, "note", "line1\nline2\"quoted\"");

        let (_, source) = render(&tree, "res");
        assert!(source.contains("{ \"note\", \"line1\\nline2\\\"quoted\\\"\" }"));
    }
}
