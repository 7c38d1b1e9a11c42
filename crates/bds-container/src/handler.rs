use bds_storage::Directory;
use bds_types::BdsResult;

/// A pluggable unit contributing behavior to the lifecycle phases.
///
/// Handlers are registered by the version-specific structure and run in
/// registration order for every phase. All methods default to no-ops so a
/// handler only implements the phases it cares about.
///
/// `assert_valid` is fail-fast: the engine stops at the first handler that
/// reports a violated invariant.
pub trait LifecycleHandler: Send + Sync {
    /// Human-readable name of this handler (for diagnostics).
    fn name(&self) -> &str;

    /// Runs once when a fresh structure is created.
    fn perform_creating(&mut self, root: &mut Directory) -> BdsResult<()> {
        let _ = root;
        Ok(())
    }

    /// Runs once when an existing structure is opened.
    fn perform_opening(&mut self, root: &mut Directory) -> BdsResult<()> {
        let _ = root;
        Ok(())
    }

    /// Runs once when a read-write structure is closed, before the tree is
    /// persisted. Effects of handlers that already ran are not rolled back
    /// when a later handler fails.
    fn perform_closing(&mut self, root: &mut Directory) -> BdsResult<()> {
        let _ = root;
        Ok(())
    }

    /// Checks this handler's structural invariants.
    fn assert_valid(&self, root: &Directory) -> BdsResult<()> {
        let _ = root;
        Ok(())
    }
}
