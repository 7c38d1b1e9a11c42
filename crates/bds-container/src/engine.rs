use tracing::{debug, warn};

use bds_storage::{Directory, Storage};
use bds_types::{BdsError, BdsResult, StructuralError, Version};

use crate::handler::LifecycleHandler;
use crate::persist;
use crate::structure::Mode;

/// The shared lifecycle state machine.
///
/// Owns the storage backend, the mounted root tree, the current mode, and
/// the handler chain. Version-specific structures compose an engine and a
/// behavior object instead of subclassing it.
///
/// States: `Unopened → {Created/ReadWrite, ReadOnly} → Unopened`. The
/// backend is unmounted on every exit path out of the lifecycle operations,
/// including handler and validation failures.
pub struct LifecycleEngine {
    storage: Box<dyn Storage>,
    version: Version,
    handlers: Vec<Box<dyn LifecycleHandler>>,
    root: Option<Directory>,
    mode: Option<Mode>,
}

impl LifecycleEngine {
    /// Create an unopened engine for the given backend and version.
    pub fn new(storage: Box<dyn Storage>, version: Version) -> Self {
        Self {
            storage,
            version,
            handlers: Vec::new(),
            root: None,
            mode: None,
        }
    }

    /// The structural version this engine reads and writes.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The current mode, while open or created.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Append a handler; phases run in registration order.
    pub fn register_handler(&mut self, handler: Box<dyn LifecycleHandler>) {
        self.handlers.push(handler);
    }

    /// Drop all registered handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// `true` iff a root tree is currently loaded.
    pub fn is_open_or_created(&self) -> bool {
        self.root.is_some()
    }

    /// The mounted root tree.
    pub fn root(&self) -> BdsResult<&Directory> {
        self.root
            .as_ref()
            .ok_or(BdsError::NotOpenedOrCreated { operation: "root" })
    }

    /// Mutable access to the mounted root tree.
    pub fn root_mut(&mut self) -> BdsResult<&mut Directory> {
        self.root
            .as_mut()
            .ok_or(BdsError::NotOpenedOrCreated { operation: "root" })
    }

    /// Mount the backend and run the Creating phase; leaves the engine in
    /// read-write mode.
    pub fn create(&mut self) -> BdsResult<()> {
        let mut root = self.storage.mount()?;
        debug!(container = self.storage.name(), version = %self.version, "creating data structure");
        for index in 0..self.handlers.len() {
            if let Err(err) = self.handlers[index].perform_creating(&mut root) {
                self.release_after_failure();
                return Err(err);
            }
        }
        self.root = Some(root);
        self.mode = Some(Mode::ReadWrite);
        Ok(())
    }

    /// Mount the backend, run the Opening phase, check the stored version,
    /// and optionally run the fail-fast Validation phase.
    pub fn open(&mut self, mode: Mode, validate: bool) -> BdsResult<()> {
        let mut root = self.storage.mount()?;
        debug!(container = self.storage.name(), version = %self.version, ?mode, "opening data structure");
        if let Err(err) = self.run_opening(&mut root, validate) {
            self.release_after_failure();
            return Err(err);
        }
        self.root = Some(root);
        self.mode = Some(mode);
        Ok(())
    }

    fn run_opening(&mut self, root: &mut Directory, validate: bool) -> BdsResult<()> {
        for index in 0..self.handlers.len() {
            self.handlers[index].perform_opening(root)?;
        }
        let stored = persist::load_version(root)?;
        if !self.version.is_backwards_compatible_with(stored) {
            return Err(StructuralError::IncompatibleVersion {
                stored,
                supported: self.version,
            }
            .into());
        }
        if validate {
            self.validate(root)?;
        }
        Ok(())
    }

    /// Run every handler's `assert_valid`, stopping at the first violation.
    pub fn validate(&self, root: &Directory) -> BdsResult<()> {
        for handler in &self.handlers {
            handler.assert_valid(root)?;
        }
        Ok(())
    }

    /// Close the structure. In read-write mode the Closing phase runs, the
    /// current version is persisted, and the tree is saved; in any mode the
    /// backend is unmounted and the engine returns to `Unopened`.
    ///
    /// Closing handlers that already ran are not rolled back when a later
    /// handler fails; the tree is only saved when the whole phase succeeded.
    pub fn close(&mut self) -> BdsResult<()> {
        let mut root = self
            .root
            .take()
            .ok_or(BdsError::NotOpenedOrCreated { operation: "close" })?;
        let mode = self.mode.take();

        if mode == Some(Mode::ReadWrite) {
            for index in 0..self.handlers.len() {
                if let Err(err) = self.handlers[index].perform_closing(&mut root) {
                    self.release_after_failure();
                    return Err(err);
                }
            }
            if let Err(err) = persist::save_version(self.version, &mut root)
                .and_then(|()| self.storage.save(&root))
            {
                self.release_after_failure();
                return Err(err);
            }
        }

        self.storage.unmount()?;
        debug!(container = self.storage.name(), "closed data structure");
        Ok(())
    }

    /// Abandon an open or created session without persisting anything.
    /// Used when post-open setup fails after the engine itself succeeded.
    pub(crate) fn abort(&mut self) {
        self.release_after_failure();
    }

    fn release_after_failure(&mut self) {
        self.root = None;
        self.mode = None;
        if let Err(err) = self.storage.unmount() {
            warn!(error = %err, "unmount after failed lifecycle operation also failed");
        }
    }
}
