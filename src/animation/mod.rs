//! # Timer-Driven Animation
//!
//! An animator is a cooperative repeating timer: every `period` it applies a
//! caller-supplied state-delta function to a shape and requests a redraw,
//! until an optional duration elapses or the animation is cancelled. The
//! contract is "apply F to shape S every period until D elapses or
//! cancelled" -- the thread behind it is an implementation detail.
//!
//! Animator threads hold only a [`Weak`] reference to their shape: a shape
//! removed from its surface (or dropped entirely) may still be ticked by a
//! live animator, which then observes the dead reference and stops cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use crate::gfx::shape::Shape;

/// One animator invocation.
#[derive(Debug, Clone, Copy)]
pub struct AnimationTick {
    /// Time since the animation started.
    pub elapsed: Duration,
    /// Completion in [0, 1] for bounded animations, `None` for unbounded
    /// ones. The final tick of a bounded animation always reports exactly
    /// 1.0 so interpolated placements land on their target.
    pub progress: Option<f32>,
}

/// Cancellation/completion handle for a running animation.
///
/// Cloneable; every clone controls the same animation. Dropping all handles
/// does not cancel the animation.
#[derive(Clone)]
pub struct AnimationHandle {
    shared: Arc<AnimationShared>,
}

struct AnimationShared {
    cancelled: AtomicBool,
    finished: AtomicBool,
}

impl AnimationHandle {
    /// Requests cancellation; the animator observes it within one period.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// True once the animator thread has exited (completed, cancelled, or
    /// its shape went away).
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::SeqCst)
    }
}

/// Starts an animator for `shape`.
///
/// Prefer [`Shape::animate`], which also attaches the handle to the shape so
/// `cancel_animations` can reach it.
pub fn spawn<F>(
    shape: Weak<Shape>,
    period: Duration,
    duration: Option<Duration>,
    mut f: F,
) -> AnimationHandle
where
    F: FnMut(&Shape, AnimationTick) + Send + 'static,
{
    let shared = Arc::new(AnimationShared {
        cancelled: AtomicBool::new(false),
        finished: AtomicBool::new(false),
    });
    let thread_shared = shared.clone();

    let spawned = thread::Builder::new()
        .name("drystane-animator".into())
        .spawn(move || {
            let start = Instant::now();
            loop {
                if thread_shared.cancelled.load(Ordering::SeqCst) {
                    break;
                }
                // A detached or dropped shape ends the animation; ticking
                // must never dereference a dead back-reference.
                let Some(shape) = shape.upgrade() else {
                    break;
                };
                let elapsed = start.elapsed();
                let (tick, last) = match duration {
                    Some(d) if elapsed >= d => (
                        AnimationTick {
                            elapsed: d,
                            progress: Some(1.0),
                        },
                        true,
                    ),
                    Some(d) => (
                        AnimationTick {
                            elapsed,
                            progress: Some(elapsed.as_secs_f32() / d.as_secs_f32()),
                        },
                        false,
                    ),
                    None => (
                        AnimationTick {
                            elapsed,
                            progress: None,
                        },
                        false,
                    ),
                };
                f(&shape, tick);
                shape.request_redraw();
                // Release the strong reference before sleeping so the
                // animator never keeps a removed shape alive across a tick
                // gap.
                drop(shape);
                if last {
                    break;
                }
                thread::sleep(period);
            }
            thread_shared.finished.store(true, Ordering::SeqCst);
        });

    if let Err(err) = spawned {
        log::error!("failed to spawn animator thread: {err}");
        shared.finished.store(true, Ordering::SeqCst);
    }

    AnimationHandle { shared }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::color::Color;
    use crate::gfx::primitive::Triangle;
    use cgmath::Vector3;

    fn test_shape() -> Arc<Shape> {
        let t = Triangle::uniform(
            "t",
            [
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            Color::WHITE,
        )
        .unwrap();
        Arc::new(Shape::from_triangles("s", &[t]).unwrap())
    }

    #[test]
    fn bounded_animation_ends_with_progress_one() {
        let shape = test_shape();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handle = spawn(
            Arc::downgrade(&shape),
            Duration::from_millis(5),
            Some(Duration::from_millis(40)),
            move |_, tick| sink.lock().unwrap().push(tick.progress.unwrap()),
        );
        while !handle.is_finished() {
            thread::sleep(Duration::from_millis(5));
        }
        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert_eq!(*seen.last().unwrap(), 1.0);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn cancellation_stops_the_animation() {
        let shape = test_shape();
        let handle = spawn(
            Arc::downgrade(&shape),
            Duration::from_millis(1),
            None,
            |_, _| {},
        );
        handle.cancel();
        let deadline = Instant::now() + Duration::from_secs(2);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(handle.is_finished());
    }

    #[test]
    fn dropped_shape_ends_the_animation() {
        let shape = test_shape();
        let weak = Arc::downgrade(&shape);
        drop(shape);
        let handle = spawn(weak, Duration::from_millis(1), None, |_, _| {
            panic!("ticked a dead shape")
        });
        let deadline = Instant::now() + Duration::from_secs(2);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(handle.is_finished());
    }
}
