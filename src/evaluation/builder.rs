//! Assembly of evaluation contexts from module snapshots.
//!
//! The debugger hands over one [`crate::evaluation::MetadataBlock`] per loaded module, in load
//! order and without any grouping. Assembling a context:
//!
//! 1. decodes every block's header (`Module`, `Assembly` and `File` rows) in parallel,
//! 2. drops blocks whose MVID was already seen, keeping the first,
//! 3. turns every manifest module into a [`crate::evaluation::ReferencedAssembly`],
//! 4. attaches each netmodule to the first assembly whose `File` table lists it, dropping
//!    netmodules no loaded assembly claims,
//! 5. builds the identity index, first match wins.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    evaluation::options::CompilationOptions,
    metadata::{
        identity::ModuleId,
        image::MetadataImage,
        module::LoadedModule,
        reader::MetadataReader,
        tables::{AssemblyRow, ModuleRow},
    },
    Result,
};

/// Prefix of every generated evaluation context name
pub const CONTEXT_NAME_PREFIX: &str = "<>EvaluationContext";

static CONTEXT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One loaded module's metadata, as captured at a debugger stop.
#[derive(Clone)]
pub struct MetadataBlock {
    reader: Arc<dyn MetadataReader>,
}

impl MetadataBlock {
    /// Wraps the reader of one module snapshot
    #[must_use]
    pub fn new(reader: Arc<dyn MetadataReader>) -> Self {
        MetadataBlock { reader }
    }

    /// The reader of this snapshot
    #[must_use]
    pub fn reader(&self) -> &Arc<dyn MetadataReader> {
        &self.reader
    }
}

impl From<MetadataImage> for MetadataBlock {
    fn from(image: MetadataImage) -> Self {
        MetadataBlock::new(Arc::new(image))
    }
}

impl fmt::Debug for MetadataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reader.module() {
            Ok(module) => write!(f, "MetadataBlock({}, {})", module.name, module.mvid),
            Err(_) => write!(f, "MetadataBlock(<undecodable>)"),
        }
    }
}

/// An assembly referenced by an evaluation context: its manifest module followed by any
/// netmodules attached to it.
pub struct ReferencedAssembly {
    name: String,
    modules: Vec<Arc<LoadedModule>>,
}

impl ReferencedAssembly {
    /// Simple name of the assembly
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The manifest module
    #[must_use]
    pub fn manifest_module(&self) -> &Arc<LoadedModule> {
        // Assemblies are only created from a manifest module
        &self.modules[0]
    }

    /// All modules, manifest first
    #[must_use]
    pub fn modules(&self) -> &[Arc<LoadedModule>] {
        &self.modules
    }
}

/// Header rows of one block
struct BlockHeader {
    module: ModuleRow,
    assembly: Option<AssemblyRow>,
    files: Vec<String>,
}

/// Result of [`assemble`]
pub(crate) struct Assembled {
    pub(crate) assemblies: Vec<ReferencedAssembly>,
    pub(crate) index: HashMap<ModuleId, Arc<LoadedModule>>,
}

/// Groups `blocks` into referenced assemblies and indexes their modules by identity.
///
/// # Errors
/// Returns an error if any block's `Module` row cannot be decoded.
pub(crate) fn assemble(
    blocks: &[MetadataBlock],
    options: &CompilationOptions,
) -> Result<Assembled> {
    let headers = blocks
        .par_iter()
        .map(|block| {
            Ok(BlockHeader {
                module: block.reader.module()?,
                assembly: block.reader.assembly(),
                files: block.reader.files(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let mut manifests = Vec::new();
    let mut netmodules = Vec::new();
    for (block, header) in blocks.iter().zip(headers) {
        if !seen.insert(header.module.mvid) {
            debug!(
                module = %header.module.name,
                mvid = %header.module.mvid,
                "duplicate module ignored"
            );
            continue;
        }

        if header.assembly.is_some() {
            manifests.push((block, header));
        } else {
            netmodules.push((block, header));
        }
    }

    let mut assemblies = Vec::with_capacity(manifests.len());
    let mut claimed_files = Vec::with_capacity(manifests.len());
    for (block, header) in manifests {
        let module = LoadedModule::new(block.reader.clone(), options.import_options)?;
        claimed_files.push(header.files);
        assemblies.push(ReferencedAssembly {
            name: module.assembly_name().to_string(),
            modules: vec![Arc::new(module)],
        });
    }

    for (block, header) in netmodules {
        let owner = claimed_files.iter().position(|files| {
            files
                .iter()
                .any(|file| file.eq_ignore_ascii_case(&header.module.name))
        });

        let Some(owner) = owner else {
            warn!(
                module = %header.module.name,
                mvid = %header.module.mvid,
                "netmodule not listed by any loaded assembly, dropped"
            );
            continue;
        };

        let mut module = LoadedModule::new(block.reader.clone(), options.import_options)?;
        module.attach_to(&assemblies[owner].name);
        debug!(
            module = %header.module.name,
            assembly = %assemblies[owner].name,
            "netmodule attached"
        );
        assemblies[owner].modules.push(Arc::new(module));
    }

    let mut index = HashMap::new();
    for module in assemblies.iter().flat_map(|assembly| assembly.modules.iter()) {
        index.entry(module.id()).or_insert_with(|| module.clone());
    }

    Ok(Assembled { assemblies, index })
}

/// A fresh name for an evaluation context, unique within the process and across processes
/// running at the same time
pub(crate) fn unique_name() -> String {
    let counter = CONTEXT_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}_{:08x}_{:016x}",
        CONTEXT_NAME_PREFIX,
        std::process::id(),
        counter
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{image::MetadataImageBuilder, tables::TypeAttributes},
        test::{DEMO_MVID, OTHER_MVID},
    };

    fn manifest(name: &str, mvid: ModuleId, files: &[&str]) -> MetadataBlock {
        let mut builder = MetadataImageBuilder::new(format!("{name}.dll"), mvid);
        builder.assembly(name);
        for file in files {
            builder.add_file(*file);
        }
        builder.add_type(name, "Program", TypeAttributes::PUBLIC);
        builder.build().into()
    }

    fn netmodule(name: &str, mvid: ModuleId) -> MetadataBlock {
        let mut builder = MetadataImageBuilder::new(name, mvid);
        builder.add_type("Extra", "Helper", TypeAttributes::PUBLIC);
        builder.build().into()
    }

    #[test]
    fn duplicates_keep_first() {
        let blocks = [
            manifest("Demo", DEMO_MVID, &[]),
            manifest("Copy", DEMO_MVID, &[]),
            manifest("Other", OTHER_MVID, &[]),
        ];

        let assembled = assemble(&blocks, &CompilationOptions::default()).unwrap();
        assert_eq!(assembled.assemblies.len(), 2);
        assert_eq!(assembled.index.len(), 2);
        assert_eq!(assembled.index[&DEMO_MVID].assembly_name(), "Demo");
        assert_eq!(assembled.assemblies[1].name(), "Other");
    }

    #[test]
    fn netmodules_attach_to_their_assembly() {
        let extra = ModuleId::from_bytes([0xE0; 16]);
        let orphan = ModuleId::from_bytes([0xE1; 16]);
        let blocks = [
            // Netmodule loaded before its manifest
            netmodule("Extra.netmodule", extra),
            manifest("Demo", DEMO_MVID, &["Extra.netmodule"]),
            netmodule("Orphan.netmodule", orphan),
        ];

        let assembled = assemble(&blocks, &CompilationOptions::default()).unwrap();
        assert_eq!(assembled.assemblies.len(), 1);

        let demo = &assembled.assemblies[0];
        assert_eq!(demo.modules().len(), 2);
        assert_eq!(demo.manifest_module().id(), DEMO_MVID);
        assert_eq!(demo.modules()[1].id(), extra);
        assert_eq!(demo.modules()[1].assembly_name(), "Demo");
        assert!(!demo.modules()[1].is_manifest());

        assert!(assembled.index.contains_key(&extra));
        assert!(!assembled.index.contains_key(&orphan));
    }

    #[test]
    fn unique_names() {
        let first = unique_name();
        let second = unique_name();

        assert!(first.starts_with(CONTEXT_NAME_PREFIX));
        assert_ne!(first, second);
    }

    #[test]
    fn block_debug() {
        let block = manifest("Demo", DEMO_MVID, &[]);
        assert!(format!("{block:?}").starts_with("MetadataBlock(Demo.dll, "));
    }
}
