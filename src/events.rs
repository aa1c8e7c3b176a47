//! Typed page events and the queue that carries them.
//!
//! DOM listeners, timers and async continuations all turn into an [`Event`]
//! pushed onto an [`EventBus`]. [`crate::app::App::pump`] drains the queue on
//! the single event thread, so tests can replay any sequence without a browser.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::effects::address::AddressProvider;
use crate::effects::keys::KeyPress;
use crate::error::EffectError;

/// An element whose visible fraction is being watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// A section title that fades in, by document order.
    Reveal(usize),
    /// The statistics section holding the counters.
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    ThemeToggle,
    AudioToggle,
    Logo,
    /// Anywhere else on the page.
    Page,
}

/// Deliveries from the [`crate::timer::Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    SplashTick,
    SplashHide,
    TypewriterTick,
    CounterTick,
    ConfettiExpired(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Resize { width: f64, height: f64 },
    Scroll { offset: f64 },
    Visibility { region: Region, ratio: f64 },
    /// One display refresh, with the platform's high-resolution timestamp.
    Frame { now_ms: f64 },
    Click { target: ClickTarget, x: f64, y: f64 },
    PointerDown,
    Volume(f64),
    Key(KeyPress),
    PlaybackSettled(Result<(), EffectError>),
    AddressFetched { provider: AddressProvider, body: Result<String, EffectError> },
    Timer(TimerEvent),
}

/// FIFO of pending events, shared by cheap clones.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Rc<RefCell<VecDeque<Event>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: Event) {
        self.queue.borrow_mut().push_back(event);
    }

    pub fn pop(&self) -> Option<Event> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}
