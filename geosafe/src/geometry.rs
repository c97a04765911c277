//! Geometry handle wrapper.
//!
//! A [`Geometry`] owns one engine geometry handle and holds only a weak
//! reference to the service that created it, so it never keeps the engine
//! context alive. Clones share the same underlying object: releasing through
//! any clone releases it for all of them.
//!
//! # Locking
//!
//! Operations take the service lock first and lease operand handles under the
//! geometry's read lock second. Release takes the geometry's write lock only
//! long enough to move the handle out, and drops it before touching the
//! service lock, so the two orders never interleave into a deadlock.

use crate::service::ServiceShared;
use geosafe_engine::GeomHandle;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::fmt;
use std::sync::{Arc, Weak};

/// Engine geometry owned by a [`GeoService`](crate::GeoService).
#[derive(Clone)]
pub struct Geometry {
    inner: Arc<GeometryInner>,
}

struct GeometryInner {
    handle: RwLock<Option<GeomHandle>>,
    service: Weak<ServiceShared>,
}

impl Geometry {
    pub(crate) fn new(handle: GeomHandle, service: &Arc<ServiceShared>) -> Self {
        Self {
            inner: Arc::new(GeometryInner {
                handle: RwLock::new(Some(handle)),
                service: Arc::downgrade(service),
            }),
        }
    }

    /// Destroy the engine geometry now.
    ///
    /// Idempotent, and a no-op once the owning service has been torn down or
    /// dropped. Blocks while an in-flight operation is using this geometry.
    pub fn release(&self) {
        self.inner.release();
    }

    /// True once the geometry has been released.
    pub fn is_released(&self) -> bool {
        self.inner.handle.read_recursive().is_none()
    }

    /// True if both values refer to the same geometry object.
    pub fn ptr_eq(&self, other: &Geometry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn belongs_to(&self, service: &Arc<ServiceShared>) -> bool {
        std::ptr::eq(self.inner.service.as_ptr(), Arc::as_ptr(service))
    }

    /// Borrow the live handle for the duration of an engine call.
    ///
    /// Recursive so one operation may lease the same geometry twice.
    pub(crate) fn lease(&self) -> Option<MappedRwLockReadGuard<'_, GeomHandle>> {
        RwLockReadGuard::try_map(self.inner.handle.read_recursive(), Option::as_ref).ok()
    }
}

impl GeometryInner {
    fn release(&self) {
        // The geometry lock is released at the end of this statement.
        let Some(handle) = self.handle.write().take() else {
            return;
        };
        let Some(service) = self.service.upgrade() else {
            tracing::trace!(?handle, "service dropped, geometry release skipped");
            return;
        };
        let context = service.context.read_recursive();
        match *context {
            Some(ctx) => service.engine.geom_destroy(ctx, handle),
            None => tracing::trace!(?handle, "context torn down, geometry release skipped"),
        }
    }
}

impl Drop for GeometryInner {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geometry")
            .field("handle", &*self.inner.handle.read_recursive())
            .finish()
    }
}
