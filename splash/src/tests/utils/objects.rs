// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use crate::device::DrawingSurface;
use crate::embedded::{
    ClientResult, EmbeddedObject, EmbeddedObjectClient, EmbeddedObjectMeasurements,
    EmbeddedObjectSite,
};
use crate::geometry::{Margin, Rect, Size};
use crate::layout::PaintOptions;

/// What a [`TestObject`] does wrong, if anything.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Behavior {
    #[default]
    Normal,
    FailCreate,
    PanicCreate,
    FailMeasure,
    PanicMeasure,
    PanicShow,
    FailPaint,
    PanicPaint,
}

/// Counts calls into the clients of one [`TestObject`].
#[derive(Debug, Default)]
pub(crate) struct ObjectLog {
    pub(crate) created: Cell<u32>,
    pub(crate) measured: Cell<u32>,
    pub(crate) shown: Cell<u32>,
    pub(crate) hidden: Cell<u32>,
    pub(crate) painted: Cell<u32>,
    pub(crate) disposed: Cell<u32>,
    pub(crate) last_bounds: Cell<Option<Rect>>,
    pub(crate) last_char_index: Cell<Option<usize>>,
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

#[derive(Debug)]
pub(crate) struct TestObject {
    measurements: EmbeddedObjectMeasurements,
    behavior: Behavior,
    pub(crate) log: Rc<ObjectLog>,
}

impl TestObject {
    pub(crate) fn new(width: i32, height: i32, descent: i32) -> Self {
        Self {
            measurements: EmbeddedObjectMeasurements {
                size: Size::new(width, height),
                margin: Margin::ZERO,
                descent,
            },
            behavior: Behavior::Normal,
            log: Rc::default(),
        }
    }

    pub(crate) fn with_margin(mut self, margin: Margin) -> Self {
        self.measurements.margin = margin;
        self
    }

    pub(crate) fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Wraps the object for a document, keeping a handle to its log.
    pub(crate) fn into_parts(self) -> (Rc<dyn EmbeddedObject>, Rc<ObjectLog>) {
        let log = Rc::clone(&self.log);
        (Rc::new(self), log)
    }
}

impl EmbeddedObject for TestObject {
    fn create_client(
        &self,
        site: &EmbeddedObjectSite,
    ) -> ClientResult<Box<dyn EmbeddedObjectClient>> {
        match self.behavior {
            Behavior::FailCreate => return Err("no client today".into()),
            Behavior::PanicCreate => panic!("client construction exploded"),
            _ => {}
        }
        bump(&self.log.created);
        self.log.last_char_index.set(Some(site.char_index));
        Ok(Box::new(TestClient {
            measurements: self.measurements,
            behavior: self.behavior,
            log: Rc::clone(&self.log),
        }))
    }
}

struct TestClient {
    measurements: EmbeddedObjectMeasurements,
    behavior: Behavior,
    log: Rc<ObjectLog>,
}

impl EmbeddedObjectClient for TestClient {
    fn measure(&mut self) -> ClientResult<EmbeddedObjectMeasurements> {
        bump(&self.log.measured);
        match self.behavior {
            Behavior::FailMeasure => Err("cannot measure".into()),
            Behavior::PanicMeasure => panic!("measurement exploded"),
            _ => Ok(self.measurements),
        }
    }

    fn paint(
        &mut self,
        _surface: &mut dyn DrawingSurface,
        _options: &PaintOptions,
        bounds: Rect,
        _right_to_left: bool,
    ) -> ClientResult<()> {
        bump(&self.log.painted);
        self.log.last_bounds.set(Some(bounds));
        match self.behavior {
            Behavior::FailPaint => Err("cannot paint".into()),
            Behavior::PanicPaint => panic!("paint exploded"),
            _ => Ok(()),
        }
    }

    fn show(&mut self, bounds: Rect, _right_to_left: bool) -> ClientResult<()> {
        bump(&self.log.shown);
        self.log.last_bounds.set(Some(bounds));
        if self.behavior == Behavior::PanicShow {
            panic!("show exploded");
        }
        Ok(())
    }

    fn hide(&mut self) -> ClientResult<()> {
        bump(&self.log.hidden);
        Ok(())
    }

    fn dispose(&mut self) -> ClientResult<()> {
        bump(&self.log.disposed);
        Ok(())
    }
}
