use libloading::Library;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use thiserror::Error;

use crate::plugin::{
    CreatePluginFn, DestroyPluginFn, Plugin, PluginContext, PluginMenuItem, RawPlugin,
    CREATE_SYMBOL, DESTROY_SYMBOL,
};

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("cannot open plugin module {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("plugin module {} does not export `{symbol}`", path.display())]
    MissingSymbol { path: PathBuf, symbol: &'static str },

    #[error("plugin module {} did not produce an instance", path.display())]
    Instantiation { path: PathBuf },

    #[error("plugin module {} failed to initialize: {reason}", path.display())]
    Initialization { path: PathBuf, reason: String },

    #[error("cannot read plugin directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plugin '{plugin}' failed in {hook}: {reason}")]
    Runtime {
        plugin: String,
        hook: &'static str,
        reason: String,
    },
}

impl PluginError {
    /// True for failures that prevent a module from becoming active.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            PluginError::Load { .. }
                | PluginError::MissingSymbol { .. }
                | PluginError::Instantiation { .. }
                | PluginError::Initialization { .. }
        )
    }
}

/// An opened plugin module. Dropping it closes the module.
pub trait PluginModule {
    fn factory(&self) -> Option<CreatePluginFn>;
    fn destructor(&self) -> Option<DestroyPluginFn>;
}

/// Opens plugin modules from the filesystem.
pub trait ModuleLoader {
    type Module: PluginModule;

    fn open(&self, path: &Path) -> Result<Self::Module, PluginError>;
}

/// Loads plugins as native shared libraries.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

pub struct DylibModule {
    library: Library,
}

impl ModuleLoader for DylibLoader {
    type Module = DylibModule;

    fn open(&self, path: &Path) -> Result<DylibModule, PluginError> {
        // SAFETY: opening a library runs its initialisers. Modules in the
        // plugin directory are trusted to be notepad plugins.
        let library = unsafe { Library::new(path) }.map_err(|e| PluginError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(DylibModule { library })
    }
}

impl PluginModule for DylibModule {
    fn factory(&self) -> Option<CreatePluginFn> {
        // SAFETY: the symbol type matches what `declare_plugin!` exports.
        // The copied function pointer is only used while the record that
        // owns this library is alive.
        unsafe { self.library.get::<CreatePluginFn>(CREATE_SYMBOL) }
            .ok()
            .map(|symbol| *symbol)
    }

    fn destructor(&self) -> Option<DestroyPluginFn> {
        // SAFETY: see `factory`.
        unsafe { self.library.get::<DestroyPluginFn>(DESTROY_SYMBOL) }
            .ok()
            .map(|symbol| *symbol)
    }
}

/// Live plugin object produced by a module factory. Only the owning
/// [`PluginRecord`] may release it.
struct PluginInstance(NonNull<Box<dyn Plugin>>);

impl PluginInstance {
    fn get(&self) -> &dyn Plugin {
        // SAFETY: the pointer came from a factory and stays valid until
        // the record releases it.
        unsafe { self.0.as_ref().as_ref() }
    }

    fn get_mut(&mut self) -> &mut dyn Plugin {
        // SAFETY: see `get`; `&mut self` guarantees exclusive access.
        unsafe { self.0.as_mut().as_mut() }
    }

    fn into_raw(self) -> RawPlugin {
        self.0.as_ptr()
    }
}

/// Binds a live plugin instance to the module that backs its code.
struct PluginRecord<M: PluginModule> {
    instance: Option<PluginInstance>,
    name: String,
    path: PathBuf,
    // Declared after `instance`: the module must outlive the instance.
    module: M,
}

impl<M: PluginModule> PluginRecord<M> {
    fn plugin(&self) -> Option<&dyn Plugin> {
        self.instance.as_ref().map(PluginInstance::get)
    }

    fn plugin_mut(&mut self) -> Option<&mut dyn Plugin> {
        self.instance.as_mut().map(PluginInstance::get_mut)
    }
}

impl<M: PluginModule> Drop for PluginRecord<M> {
    fn drop(&mut self) {
        let Some(instance) = self.instance.take() else {
            return;
        };
        let raw = instance.into_raw();
        match self.module.destructor() {
            // SAFETY: `raw` was produced by this module's factory and is
            // released exactly once.
            Some(destroy) => unsafe { destroy(raw) },
            None => {
                log::warn!(
                    "Plugin module {} exports no destructor, releasing '{}' directly",
                    self.path.display(),
                    self.name
                );
                // SAFETY: plugin and host share the global allocator.
                drop(unsafe { Box::from_raw(raw) });
            }
        }
        log::debug!("Released plugin '{}'", self.name);
        // `module` is dropped after this body, closing the library.
    }
}

/// Position of a plugin in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(usize);

impl PluginId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub id: PluginId,
    pub name: String,
    pub version: String,
    pub description: String,
    pub path: PathBuf,
}

/// Outcome of scanning a plugin directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<PluginId>,
    pub failures: Vec<PluginError>,
}

thread_local! {
    static IN_PLUGIN_CALL: Cell<bool> = const { Cell::new(false) };
}

/// True while the current thread is executing plugin code on behalf of the
/// host. A panic hook can use it to tell isolated plugin panics apart
/// from host panics.
pub fn in_plugin_call() -> bool {
    IN_PLUGIN_CALL.with(Cell::get)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Run one plugin call, turning both `Err` and panics into
/// [`PluginError::Runtime`].
fn guarded<R>(
    plugin: &str,
    hook: &'static str,
    call: impl FnOnce() -> anyhow::Result<R>,
) -> Result<R, PluginError> {
    let outer = IN_PLUGIN_CALL.with(|flag| flag.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(call));
    IN_PLUGIN_CALL.with(|flag| flag.set(outer));

    let reason = match outcome {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(err)) => format!("{err:#}"),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };
    let err = PluginError::Runtime {
        plugin: plugin.to_string(),
        hook,
        reason,
    };
    log::error!("{err}");
    Err(err)
}

/// Loads plugin modules, keeps them alive, and fans hooks out to them in
/// load order.
pub struct PluginHost<L: ModuleLoader = DylibLoader> {
    loader: L,
    records: Vec<PluginRecord<L::Module>>,
}

impl PluginHost<DylibLoader> {
    pub fn new() -> Self {
        Self::with_loader(DylibLoader)
    }
}

impl Default for PluginHost<DylibLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ModuleLoader> PluginHost<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Open one module, instantiate and initialize its plugin.
    ///
    /// The module is closed again on every failure path, so a failed load
    /// leaves nothing behind.
    pub fn load_plugin(
        &mut self,
        path: impl AsRef<Path>,
        ctx: &PluginContext,
    ) -> Result<PluginId, PluginError> {
        let path = path.as_ref();
        let module = self.loader.open(path)?;

        let factory = module.factory().ok_or_else(|| PluginError::MissingSymbol {
            path: path.to_path_buf(),
            symbol: "notepad_create_plugin",
        })?;

        // SAFETY: the factory has the signature exported by
        // `declare_plugin!`; a null result means no instance.
        let raw = unsafe { factory() };
        let Some(ptr) = NonNull::new(raw) else {
            return Err(PluginError::Instantiation {
                path: path.to_path_buf(),
            });
        };

        let label = path.display().to_string();
        let mut record = PluginRecord {
            instance: Some(PluginInstance(ptr)),
            name: label.clone(),
            path: path.to_path_buf(),
            module,
        };

        // On failure `record` drops here: instance first, then the module.
        let initialized = match record.plugin_mut() {
            Some(plugin) => guarded(&label, "initialize", || {
                let name = plugin.name().to_string();
                let version = plugin.version().to_string();
                plugin.initialize(ctx.clone());
                Ok((name, version))
            }),
            None => Ok((label.clone(), String::new())),
        };
        let (name, version) = initialized.map_err(|err| PluginError::Initialization {
            path: path.to_path_buf(),
            reason: match err {
                PluginError::Runtime { reason, .. } => reason,
                other => other.to_string(),
            },
        })?;

        log::info!(
            "Loaded plugin '{}' v{} from {}",
            name,
            version,
            path.display()
        );
        record.name = name;

        let id = PluginId(self.records.len());
        self.records.push(record);
        Ok(id)
    }

    /// Load every entry of `dir` carrying the platform's shared-library
    /// suffix, in file-name order. Individual failures are collected in
    /// the report and do not stop the scan.
    pub fn load_from_directory(
        &mut self,
        dir: impl AsRef<Path>,
        ctx: &PluginContext,
    ) -> Result<LoadReport, PluginError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| PluginError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.len() > std::env::consts::DLL_SUFFIX.len()
                            && name.ends_with(std::env::consts::DLL_SUFFIX)
                    })
            })
            .collect();
        candidates.sort();

        let mut report = LoadReport::default();
        for path in candidates {
            match self.load_plugin(&path, ctx) {
                Ok(id) => report.loaded.push(id),
                Err(err) => {
                    log::warn!("Skipping plugin: {err}");
                    report.failures.push(err);
                }
            }
        }

        log::info!(
            "Plugin scan of {}: {} loaded, {} failed",
            dir.display(),
            report.loaded.len(),
            report.failures.len()
        );
        Ok(report)
    }

    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let plugin = record.plugin()?;
                Some(PluginInfo {
                    id: PluginId(index),
                    name: plugin.name().to_string(),
                    version: plugin.version().to_string(),
                    description: plugin.description().to_string(),
                    path: record.path.clone(),
                })
            })
            .collect()
    }

    /// Every declared menu item, paired with its plugin, in load order and
    /// per-plugin declaration order. A plugin that panics while listing
    /// its items contributes none.
    pub fn collect_menu_items(&self) -> Vec<(PluginId, PluginMenuItem)> {
        let mut items = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            let Some(plugin) = record.plugin() else {
                continue;
            };
            if let Ok(declared) = guarded(&record.name, "menu_items", || Ok(plugin.menu_items()))
            {
                items.extend(declared.into_iter().map(|item| (PluginId(index), item)));
            }
        }
        items
    }

    /// Dispatch a menu action to the plugin that declared it.
    pub fn execute(&mut self, id: PluginId, action: &str) -> Result<(), PluginError> {
        let Some(record) = self.records.get_mut(id.0) else {
            return Err(PluginError::Runtime {
                plugin: format!("#{}", id.0),
                hook: "execute",
                reason: "no such plugin".to_string(),
            });
        };
        let name = record.name.clone();
        match record.plugin_mut() {
            Some(plugin) => guarded(&name, "execute", || plugin.execute(action)),
            None => Ok(()),
        }
    }

    /// Call `on_open` on every plugin. Failures are isolated per plugin and
    /// returned.
    pub fn notify_open(&mut self, path: &Path) -> Vec<PluginError> {
        self.broadcast("on_open", |plugin| plugin.on_open(path))
    }

    /// Call `on_save` on every plugin. Failures are isolated per plugin and
    /// returned.
    pub fn notify_save(&mut self, path: &Path) -> Vec<PluginError> {
        self.broadcast("on_save", |plugin| plugin.on_save(path))
    }

    fn broadcast(
        &mut self,
        hook: &'static str,
        mut call: impl FnMut(&mut dyn Plugin) -> anyhow::Result<()>,
    ) -> Vec<PluginError> {
        let mut failures = Vec::new();
        for record in &mut self.records {
            let name = record.name.clone();
            if let Some(plugin) = record.plugin_mut() {
                if let Err(err) = guarded(&name, hook, || call(plugin)) {
                    failures.push(err);
                }
            }
        }
        failures
    }

    /// Destroy every plugin and close its module.
    pub fn unload_all(&mut self) {
        if !self.records.is_empty() {
            log::info!("Unloading {} plugin(s)", self.records.len());
        }
        self.records.clear();
    }
}

impl<L: ModuleLoader> Drop for PluginHost<L> {
    fn drop(&mut self) {
        self.unload_all();
    }
}
