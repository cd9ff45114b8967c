// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inline objects supplied by the document's author.
//!
//! Embedded objects are outside of the engine's control. Every call into one
//! goes through a fault boundary: returned errors and panics are logged and
//! replaced with a safe default, so a misbehaving object disappears from the
//! layout instead of breaking it. Panics are only caught with the `std`
//! feature.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::fmt;

use crate::device::{DrawingSurface, SurfaceHandle};
use crate::geometry::{Margin, Rect, Size};
use crate::layout::PaintOptions;
use crate::style::Style;

/// Error reported by an embedded object.
pub type ClientError = Box<dyn core::error::Error + Send + Sync>;

/// Result of a call into an embedded object.
pub type ClientResult<T> = Result<T, ClientError>;

/// Read-only context describing where an embedded object sits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedObjectSite {
    /// Style of the paragraph containing the object.
    pub paragraph_style: Style,
    /// Style of the object's own run.
    pub inline_style: Style,
    /// Document character index of the object's placeholder.
    pub char_index: usize,
    /// Handle of the surface the layout was computed against.
    pub parent_surface: SurfaceHandle,
    /// Whether the layout reads right-to-left.
    pub right_to_left: bool,
}

/// Size of an embedded object and the space around it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EmbeddedObjectMeasurements {
    /// Size of the object's box.
    pub size: Size,
    /// Space around the box.
    pub margin: Margin,
    /// Distance from the bottom of the box to the text baseline.
    pub descent: i32,
}

impl EmbeddedObjectMeasurements {
    /// Measurements of an object that takes no space.
    pub const EMPTY: Self = Self {
        size: Size::ZERO,
        margin: Margin::ZERO,
        descent: 0,
    };

    /// Measurements with the given size and no margin or descent.
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            margin: Margin::ZERO,
            descent: 0,
        }
    }
}

/// An object placed inline in a document.
///
/// The document only stores the object. A client is created for it when it
/// is first laid out, and that client does all of the work.
pub trait EmbeddedObject {
    /// Creates the interactive client for this object at `site`.
    fn create_client(
        &self,
        site: &EmbeddedObjectSite,
    ) -> ClientResult<Box<dyn EmbeddedObjectClient>>;
}

/// The interactive part of an [`EmbeddedObject`].
pub trait EmbeddedObjectClient {
    /// Measures the object. Only called once per client.
    fn measure(&mut self) -> ClientResult<EmbeddedObjectMeasurements>;

    /// Whether [`paint`](Self::paint) should be called during paint passes.
    fn requires_paint(&self) -> bool {
        true
    }

    /// Paints the object into `bounds`.
    fn paint(
        &mut self,
        surface: &mut dyn DrawingSurface,
        options: &PaintOptions,
        bounds: Rect,
        right_to_left: bool,
    ) -> ClientResult<()>;

    /// Makes the object visible at `bounds`.
    fn show(&mut self, bounds: Rect, right_to_left: bool) -> ClientResult<()>;

    /// Hides the object.
    fn hide(&mut self) -> ClientResult<()>;

    /// Releases the client's resources.
    fn dispose(&mut self) -> ClientResult<()> {
        Ok(())
    }
}

/// Runs a call into an embedded object, containing errors and panics.
#[cfg(feature = "std")]
fn contain<T>(operation: &str, f: impl FnOnce() -> ClientResult<T>) -> Option<T> {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => log_failure(operation, result),
        Err(_) => {
            log::error!("embedded object panicked while trying to {operation}");
            None
        }
    }
}

/// Runs a call into an embedded object, containing errors.
///
/// Without `std` panics cannot be caught and unwind through the layout.
#[cfg(not(feature = "std"))]
fn contain<T>(operation: &str, f: impl FnOnce() -> ClientResult<T>) -> Option<T> {
    log_failure(operation, f())
}

fn log_failure<T>(operation: &str, result: ClientResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::error!("embedded object failed to {operation}: {err}");
            None
        }
    }
}

/// Binds one embedded object to its position and manages its client.
pub struct EmbeddedObjectHost {
    object: Weak<dyn EmbeddedObject>,
    site: EmbeddedObjectSite,
    client: Option<Box<dyn EmbeddedObjectClient>>,
    client_requested: bool,
    measurements: Option<EmbeddedObjectMeasurements>,
    shown: Option<(Rect, bool)>,
    disposed: bool,
    pub(crate) visited: bool,
    pub(crate) bound: bool,
}

impl EmbeddedObjectHost {
    /// Creates a host for `object` at `site`. The client is created lazily.
    pub fn new(object: &Rc<dyn EmbeddedObject>, site: EmbeddedObjectSite) -> Self {
        Self {
            object: Rc::downgrade(object),
            site,
            client: None,
            client_requested: false,
            measurements: None,
            shown: None,
            disposed: false,
            visited: false,
            bound: true,
        }
    }

    /// The object's position and style context.
    pub fn site(&self) -> &EmbeddedObjectSite {
        &self.site
    }

    /// Returns `true` if the host is bound to `object`.
    pub fn is_bound_to(&self, object: &Rc<dyn EmbeddedObject>) -> bool {
        core::ptr::addr_eq(self.object.as_ptr(), Rc::as_ptr(object))
    }

    /// Returns `true` if a client currently exists.
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Returns `true` if the client was last shown and not hidden since.
    pub fn is_shown(&self) -> bool {
        self.shown.is_some()
    }

    /// Creates the client if that hasn't been attempted yet.
    ///
    /// A failed creation leaves the host without a client: the object is
    /// then invisible and measures as empty.
    pub fn create_client(&mut self) {
        if self.client_requested || self.disposed {
            return;
        }
        self.client_requested = true;
        let Some(object) = self.object.upgrade() else {
            log::warn!(
                "embedded object at char {} was dropped before its client was created",
                self.site.char_index
            );
            return;
        };
        let site = &self.site;
        self.client = contain("create its client", || object.create_client(site));
    }

    /// Disposes the current client and creates a new one, forgetting the
    /// cached measurements.
    pub fn recreate_client(&mut self) {
        self.release_client();
        self.client_requested = false;
        self.measurements = None;
        self.create_client();
    }

    /// Returns the object's measurements.
    ///
    /// The first successful result is cached until the client is recreated.
    /// Without a client, or after a failure, the object measures as empty.
    pub fn measure(&mut self) -> EmbeddedObjectMeasurements {
        if let Some(measurements) = self.measurements {
            return measurements;
        }
        self.create_client();
        let Some(client) = self.client.as_mut() else {
            return EmbeddedObjectMeasurements::EMPTY;
        };
        match contain("measure", || client.measure()) {
            Some(measurements) => {
                self.measurements = Some(measurements);
                measurements
            }
            None => EmbeddedObjectMeasurements::EMPTY,
        }
    }

    /// Whether the client wants to be painted.
    pub fn requires_paint(&self) -> bool {
        let Some(client) = self.client.as_ref() else {
            return false;
        };
        contain("report whether it requires paint", || {
            Ok(client.requires_paint())
        })
        .unwrap_or(false)
    }

    /// Shows the client at `bounds`. Repeating the last call is a no-op.
    pub fn show(&mut self, bounds: Rect, right_to_left: bool) {
        if self.shown == Some((bounds, right_to_left)) {
            return;
        }
        self.shown = Some((bounds, right_to_left));
        if let Some(client) = self.client.as_mut() {
            contain("show", || client.show(bounds, right_to_left));
        }
    }

    /// Hides the client. Does nothing if it is already hidden.
    pub fn hide(&mut self) {
        if self.shown.take().is_none() {
            return;
        }
        if let Some(client) = self.client.as_mut() {
            contain("hide", || client.hide());
        }
    }

    /// Paints the client into `bounds`, if there is one.
    pub fn paint(
        &mut self,
        surface: &mut dyn DrawingSurface,
        options: &PaintOptions,
        bounds: Rect,
        right_to_left: bool,
    ) {
        if let Some(client) = self.client.as_mut() {
            contain("paint", || client.paint(surface, options, bounds, right_to_left));
        }
    }

    /// Releases the client. Subsequent calls do nothing and no new client is
    /// created afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.release_client();
    }

    fn release_client(&mut self) {
        self.shown = None;
        if let Some(mut client) = self.client.take() {
            contain("dispose", || client.dispose());
        }
    }
}

impl fmt::Debug for EmbeddedObjectHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedObjectHost")
            .field("site", &self.site)
            .field("has_client", &self.client.is_some())
            .field("client_requested", &self.client_requested)
            .field("measurements", &self.measurements)
            .field("shown", &self.shown)
            .field("disposed", &self.disposed)
            .field("visited", &self.visited)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

impl Drop for EmbeddedObjectHost {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::NullSurface;
    use crate::tests::utils::{Behavior, TestObject};

    fn host_for(object: &Rc<dyn EmbeddedObject>) -> EmbeddedObjectHost {
        let site = EmbeddedObjectSite {
            paragraph_style: Style::default(),
            inline_style: Style::default(),
            char_index: 7,
            parent_surface: SurfaceHandle::default(),
            right_to_left: false,
        };
        EmbeddedObjectHost::new(object, site)
    }

    #[test]
    fn measurement_is_cached_until_the_client_is_recreated() {
        let (object, log) = TestObject::new(30, 40, 5).into_parts();
        let mut host = host_for(&object);
        assert_eq!(host.measure().size, Size::new(30, 40));
        assert_eq!(host.measure().descent, 5);
        assert_eq!(log.created.get(), 1);
        assert_eq!(log.measured.get(), 1);
        assert_eq!(log.last_char_index.get(), Some(7));

        host.recreate_client();
        assert_eq!(log.disposed.get(), 1);
        assert_eq!(log.created.get(), 2);
        assert_eq!(host.measure().size, Size::new(30, 40));
        assert_eq!(log.measured.get(), 2);
    }

    #[test]
    fn dispose_releases_the_client_once() {
        let (object, log) = TestObject::new(10, 10, 0).into_parts();
        let mut host = host_for(&object);
        host.create_client();
        assert!(host.has_client());
        host.dispose();
        host.dispose();
        assert!(!host.has_client());
        assert_eq!(log.disposed.get(), 1);

        // No new client after disposal.
        host.create_client();
        assert_eq!(host.measure(), EmbeddedObjectMeasurements::EMPTY);
        assert_eq!(log.created.get(), 1);
        drop(host);
        assert_eq!(log.disposed.get(), 1);
    }

    #[test]
    fn show_and_hide_skip_repeated_calls() {
        let (object, log) = TestObject::new(10, 10, 0).into_parts();
        let mut host = host_for(&object);
        host.create_client();
        let bounds = Rect::new(1, 2, 10, 10);

        host.show(bounds, false);
        host.show(bounds, false);
        assert_eq!(log.shown.get(), 1);
        host.show(bounds, true);
        assert_eq!(log.shown.get(), 2);
        host.show(Rect::new(5, 2, 10, 10), true);
        assert_eq!(log.shown.get(), 3);

        host.hide();
        host.hide();
        assert_eq!(log.hidden.get(), 1);
        assert!(!host.is_shown());
    }

    #[test]
    #[cfg_attr(
        not(feature = "std"),
        ignore = "panics are only contained with the `std` feature"
    )]
    fn failures_are_contained() {
        let (object, log) = TestObject::new(10, 10, 0)
            .with_behavior(Behavior::PanicPaint)
            .into_parts();
        let mut host = host_for(&object);
        assert_eq!(host.measure().size, Size::new(10, 10));
        host.paint(
            &mut NullSurface,
            &PaintOptions::default(),
            Rect::new(0, 0, 10, 10),
            false,
        );
        assert_eq!(log.painted.get(), 1);
        assert!(host.has_client(), "a failed paint keeps the client");
    }

    #[test]
    fn dropped_objects_get_no_client() {
        let (object, log) = TestObject::new(10, 10, 0).into_parts();
        let mut host = host_for(&object);
        drop(object);
        assert_eq!(host.measure(), EmbeddedObjectMeasurements::EMPTY);
        assert_eq!(log.created.get(), 0);
    }
}
