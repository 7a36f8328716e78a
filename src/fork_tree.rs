//! The shared tree handle.
//!
//! # Lifecycle
//!
//! ```text
//! root:        init ── fork ── fork ── ... ── reap_children ── render ── destroy
//!                       │       │
//! descendants:          └ fork ─┴ fork ... exit
//! ```
//!
//! A `ForkTree` is created once by the process that becomes the root. Every
//! forked descendant inherits a bitwise copy of it: the descriptors and
//! `MAP_SHARED` mappings survive `fork(2)`, so there is no open step. Any
//! process in the family may call [`ForkTree::fork`]; only the root renders
//! and destroys.

use std::io::Write;

use crate::config::RenderOptions;
use crate::error::{ForkTreeError, Result};
use crate::layout::{compute_scene, ChildMap, WidthPolicy};
use crate::process::{self, Fork};
use crate::renderer::{self, Scene};
use crate::shared::{
    region::resize, Access, HeaderView, Mapping, PageStore, Placement, RegionNamer, SharedMutex,
    SharedRegion, HEADER_SIZE,
};
use crate::types::{Edge, Pid, TreeStats};

/// Handle to one fork tree.
#[derive(Debug)]
pub struct ForkTree {
    header: HeaderView,
    mutex: SharedMutex,
    // Keeps `header` and `mutex` valid; unmapped last.
    header_map: Mapping,
    meta: SharedRegion,
    pages: SharedRegion,
}

impl ForkTree {
    /// Create the shared regions and make the caller the root.
    ///
    /// Must run before the first fork, once per tree. Every error out of here
    /// is fatal for the tree and reported as [`ForkTreeError::Init`]: do not
    /// fork after one.
    pub fn init() -> Result<Self> {
        Self::create().map_err(ForkTreeError::during_init)
    }

    fn create() -> Result<Self> {
        let root = process::current_pid();
        let mut namer = RegionNamer::new(root);

        let meta = SharedRegion::create(&namer.next_name("meta"))?;
        resize(meta.as_fd(), HEADER_SIZE)?;
        let header_map = Mapping::new(meta.as_fd(), HEADER_SIZE, Access::ReadWrite)?;
        let pages = SharedRegion::create(&namer.next_name("pages"))?;

        // SAFETY: the mapping is page aligned, HEADER_SIZE long and owned by
        // the returned handle.
        let header = unsafe { HeaderView::from_ptr(header_map.as_ptr().cast()) };
        header.initialize(root);
        // SAFETY: fresh shared memory, nobody else can see it before the
        // first fork.
        let mutex = unsafe { SharedMutex::init(header.mutex_ptr())? };

        tracing::info!(root, meta = meta.name(), pages = pages.name(), "fork tree initialized");

        Ok(Self {
            header,
            mutex,
            header_map,
            meta,
            pages,
        })
    }

    /// Pid of the process that called [`ForkTree::init`].
    #[inline]
    pub fn root(&self) -> Pid {
        self.header.root()
    }

    /// Whether the calling process is the root.
    #[inline]
    pub fn is_root(&self) -> bool {
        process::current_pid() == self.root()
    }

    /// Fork and, in the parent, record the new edge before returning.
    ///
    /// If the fork succeeds but the edge cannot be recorded, the child is
    /// running anyway and the error is [`ForkTreeError::Unrecorded`] with its
    /// pid. Nothing is rolled back.
    ///
    /// # Safety
    /// Same contract as `fork(2)`: in a multithreaded caller the child may
    /// only use async-signal-safe functions until it execs or exits.
    pub unsafe fn fork(&self) -> Result<Fork> {
        let parent = process::current_pid();
        let outcome = unsafe { process::fork()? };

        if let Fork::Parent { child } = outcome {
            if let Err(e) = self.record_edge(parent, child) {
                tracing::warn!(parent, child, error = %e, "fork edge not recorded");
                return Err(ForkTreeError::Unrecorded {
                    child,
                    source: Box::new(e),
                });
            }
        }
        Ok(outcome)
    }

    /// Append one `parent → child` edge under the tree mutex.
    ///
    /// The mutex is released on every path, including a failed append.
    pub fn record_edge(&self, parent: Pid, child: Pid) -> Result<Placement> {
        let _guard = self.mutex.lock()?;

        let store = PageStore::new(self.pages.as_fd());
        let placement = store.append(self.header.page_count(), Edge::new(parent, child))?;
        self.header.set_page_count(placement.page_count);
        self.header.increment_edge_count();
        Ok(placement)
    }

    /// Root pid and store counters.
    pub fn stats(&self) -> Result<TreeStats> {
        let _guard = self.mutex.lock()?;
        Ok(TreeStats {
            root: self.root(),
            pages: self.header.page_count(),
            edges: self.header.edge_count(),
        })
    }

    /// Every recorded edge in store order.
    ///
    /// Holds the mutex only while copying out of shared memory.
    pub fn edges(&self) -> Result<Vec<Edge>> {
        let _guard = self.mutex.lock()?;
        let snapshot = PageStore::new(self.pages.as_fd()).snapshot(self.header.page_count())?;
        Ok(snapshot.edges().collect())
    }

    /// Adjacency of the recorded tree.
    pub fn child_map(&self) -> Result<ChildMap> {
        ChildMap::build(self.root(), self.edges()?)
    }

    /// Positioned geometry under `policy`, default metrics.
    pub fn scene(&self, policy: WidthPolicy) -> Result<Scene> {
        self.scene_with(policy, &RenderOptions::default())
    }

    /// Positioned geometry under `policy` and `options`' metrics.
    pub fn scene_with(&self, policy: WidthPolicy, options: &RenderOptions) -> Result<Scene> {
        let tree = self.child_map()?;
        Ok(compute_scene(&tree, policy, &options.metrics))
    }

    /// Render the tree as SVG with default options.
    ///
    /// Meant for the root after every descendant has been reaped; concurrent
    /// forks are not reflected consistently. On error the sink holds nothing
    /// usable.
    pub fn render<W: Write + ?Sized>(&self, policy: WidthPolicy, sink: &mut W) -> Result<()> {
        self.render_with(policy, &RenderOptions::default(), sink)
    }

    /// Render the tree as SVG.
    pub fn render_with<W: Write + ?Sized>(
        &self,
        policy: WidthPolicy,
        options: &RenderOptions,
        sink: &mut W,
    ) -> Result<()> {
        let scene = self.scene_with(policy, options)?;
        let bytes = renderer::write_document(&scene, options, sink)?;
        tracing::info!(?policy, nodes = scene.nodes.len(), bytes, "fork tree rendered");
        Ok(())
    }

    /// Release every shared resource. Root only, after all descendants are
    /// gone.
    ///
    /// Called from a non-root process, fails with [`ForkTreeError::NotRoot`]
    /// and leaves the tree untouched.
    pub fn destroy(self) -> Result<()> {
        let caller = process::current_pid();
        let root = self.root();
        if caller != root {
            return Err(ForkTreeError::NotRoot { root, caller });
        }

        let Self {
            header,
            mutex,
            header_map,
            meta,
            pages,
        } = self;

        let stats = {
            let _guard = mutex.lock()?;
            let edges = header.edge_count();
            let page_count = header.page_count();
            drop(pages);
            (edges, page_count)
        };

        // SAFETY: only the root is left and the mutex is unlocked.
        unsafe { mutex.destroy()? };
        drop(header_map);
        drop(meta);

        tracing::info!(root, edges = stats.0, pages = stats.1, "fork tree destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::PAGE_CAPACITY;
    use std::os::fd::AsRawFd;

    // Forking from the multithreaded test harness is avoided here; the
    // fork path is covered by the integration tests.

    #[test]
    fn test_init_is_empty() {
        let tree = ForkTree::init().unwrap();
        assert!(tree.is_root());
        let empty = TreeStats {
            root: tree.root(),
            pages: 0,
            edges: 0,
        };
        assert_eq!(tree.stats().unwrap(), empty);
        assert!(tree.edges().unwrap().is_empty());
        tree.destroy().unwrap();
    }

    #[test]
    fn test_record_and_grow() {
        let tree = ForkTree::init().unwrap();
        let root = tree.root();

        let mut grew = 0;
        for i in 0..=PAGE_CAPACITY as Pid {
            let placement = tree.record_edge(root, 10_000 + i).unwrap();
            if placement.grew {
                grew += 1;
            }
        }

        let stats = tree.stats().unwrap();
        assert_eq!(stats.edges, PAGE_CAPACITY as u32 + 1);
        assert_eq!(stats.pages, 2);
        assert_eq!(grew, 1);

        let map = tree.child_map().unwrap();
        assert_eq!(map.children(ChildMap::ROOT).len(), PAGE_CAPACITY + 1);
        tree.destroy().unwrap();
    }

    #[test]
    fn test_render_single_node() {
        let tree = ForkTree::init().unwrap();
        let mut out = Vec::new();
        tree.render(WidthPolicy::Dense, &mut out).unwrap();

        let svg = String::from_utf8(out).unwrap();
        assert!(svg.contains("viewBox=\"-70 -40 140 140\""));
        assert!(svg.contains(&format!(">{}</text>", tree.root())));
        tree.destroy().unwrap();
    }

    #[test]
    fn test_corrupt_store_fails_render() {
        let tree = ForkTree::init().unwrap();
        let root = tree.root();
        tree.record_edge(root, 5).unwrap();
        tree.record_edge(root, 5).unwrap();

        let err = tree.render(WidthPolicy::Dense, &mut Vec::new()).unwrap_err();
        assert!(err.is_corruption());
        tree.destroy().unwrap();
    }

    #[test]
    fn test_failed_growth_releases_mutex() {
        let tree = ForkTree::init().unwrap();
        let root = tree.root();
        for i in 0..PAGE_CAPACITY as Pid {
            tree.record_edge(root, 10_000 + i).unwrap();
        }

        // Page 0 is full; forbid the store from growing into page 1.
        let fd = tree.pages.as_fd().as_raw_fd();
        assert_eq!(unsafe { libc::fcntl(fd, libc::F_ADD_SEALS, libc::F_SEAL_GROW) }, 0);

        let err = tree.record_edge(root, 20_000).unwrap_err();
        assert!(matches!(err, ForkTreeError::RegionResize { .. }));

        // Both calls take the mutex again; neither may block.
        let stats = tree.stats().unwrap();
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.edges, PAGE_CAPACITY as u32);
        let err = tree.record_edge(root, 20_001).unwrap_err();
        assert!(matches!(err, ForkTreeError::RegionResize { .. }));
        assert_eq!(tree.edges().unwrap().len(), PAGE_CAPACITY);

        tree.destroy().unwrap();
    }

    #[test]
    fn test_zero_pid_not_recorded() {
        let tree = ForkTree::init().unwrap();
        let root = tree.root();

        let err = tree.record_edge(root, 0).unwrap_err();
        assert!(matches!(err, ForkTreeError::ZeroPid { child: 0, .. }));
        assert_eq!(tree.stats().unwrap().edges, 0);

        tree.record_edge(root, 7).unwrap();
        assert_eq!(tree.edges().unwrap(), vec![Edge::new(root, 7)]);
        tree.destroy().unwrap();
    }
}
