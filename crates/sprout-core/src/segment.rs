//! Route segment lists.
//!
//! A segment list is a singly linked chain of waypoint names with the speed
//! to travel at and the time to wait on arrival. Nodes are immutable and share
//! their tails, so a list can be handed to several followers.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entity::EntityHandle;
use crate::simulation::Simulation;

pub const DEFAULT_SEGMENT_SPEED: f64 = 10.0;
pub const DEFAULT_SEGMENT_DELAY: f64 = 0.0;

/// One node of a segment list.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub waypoint: String,
    pub speed: f64,
    /// Seconds to wait at the waypoint.
    pub delay: f64,
    pub next: Option<Rc<Segment>>,
}

impl Segment {
    /// This node and every node after it.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        std::iter::successors(Some(self), |s| s.next.as_deref())
    }

    pub fn waypoint_entity(&self, simulation: &dyn Simulation) -> Option<EntityHandle> {
        simulation.get_entity(&self.waypoint)
    }
}

/// Segment list entry: a bare waypoint name or a name with speed and delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentPoint {
    Name(String),
    Spec {
        name: String,
        #[serde(default)]
        speed: Option<f64>,
        #[serde(default)]
        delay: Option<f64>,
    },
}

impl From<&str> for SegmentPoint {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<(&str, f64)> for SegmentPoint {
    fn from((name, speed): (&str, f64)) -> Self {
        Self::Spec {
            name: name.to_string(),
            speed: Some(speed),
            delay: None,
        }
    }
}

impl From<(&str, f64, f64)> for SegmentPoint {
    fn from((name, speed, delay): (&str, f64, f64)) -> Self {
        Self::Spec {
            name: name.to_string(),
            speed: Some(speed),
            delay: Some(delay),
        }
    }
}

/// Build a segment list with the default speed of 10.0.
pub fn segments<I, P>(points: I) -> Option<Rc<Segment>>
where
    I: IntoIterator<Item = P>,
    I::IntoIter: DoubleEndedIterator,
    P: Into<SegmentPoint>,
{
    segments_with_speed(points, DEFAULT_SEGMENT_SPEED)
}

/// Build a segment list, tail first, so each node is created with its successor.
pub fn segments_with_speed<I, P>(points: I, default_speed: f64) -> Option<Rc<Segment>>
where
    I: IntoIterator<Item = P>,
    I::IntoIter: DoubleEndedIterator,
    P: Into<SegmentPoint>,
{
    points.into_iter().rev().fold(None, |next, point| {
        let (waypoint, speed, delay) = match point.into() {
            SegmentPoint::Name(name) => (name, None, None),
            SegmentPoint::Spec { name, speed, delay } => (name, speed, delay),
        };
        Some(Rc::new(Segment {
            waypoint,
            speed: speed.unwrap_or(default_speed),
            delay: delay.unwrap_or(DEFAULT_SEGMENT_DELAY),
            next,
        }))
    })
}
