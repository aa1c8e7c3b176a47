//! Visitor address lookup with a typewriter reveal.
//!
//! Providers are tried in order, each exactly once. The first usable address
//! is revealed one character per tick; if every provider fails the text shows
//! a fixed placeholder and nothing is retried.

use serde::Deserialize;

use super::TextSink;
use crate::constants::{ADDRESS_UNAVAILABLE, TYPEWRITER_INTERVAL_MS};
use crate::error::EffectError;
use crate::events::TimerEvent;
use crate::timer::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressProvider {
    /// `{"ip": "..."}` JSON.
    Ipify,
    /// Script body of the form `var returnCitySN = {"cip": "...", ...};`.
    SohuCityJson,
}

#[derive(Deserialize)]
struct IpifyReply {
    ip: String,
}

#[derive(Deserialize)]
struct CityReply {
    cip: String,
}

impl AddressProvider {
    /// Lookup order.
    pub const CHAIN: [Self; 2] = [Self::Ipify, Self::SohuCityJson];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ipify => "ipify",
            Self::SohuCityJson => "sohu-cityjson",
        }
    }

    #[must_use]
    pub fn url(self) -> &'static str {
        match self {
            Self::Ipify => "https://api.ipify.org?format=json",
            Self::SohuCityJson => "https://pv.sohu.com/cityjson?ie=utf-8",
        }
    }

    fn next(self) -> Option<Self> {
        let idx = Self::CHAIN.iter().position(|&p| p == self)?;
        Self::CHAIN.get(idx + 1).copied()
    }

    /// Extract the address from a response body.
    pub fn parse(self, body: &str) -> Result<String, EffectError> {
        let fail = |msg: String| EffectError::LookupFailed(format!("{}: {msg}", self.name()));
        let address = match self {
            Self::Ipify => serde_json::from_str::<IpifyReply>(body)
                .map_err(|e| fail(e.to_string()))?
                .ip,
            Self::SohuCityJson => {
                let (Some(open), Some(close)) = (body.find('{'), body.rfind('}')) else {
                    return Err(fail("no object in script body".into()));
                };
                if close < open {
                    return Err(fail("no object in script body".into()));
                }
                serde_json::from_str::<CityReply>(&body[open..=close])
                    .map_err(|e| fail(e.to_string()))?
                    .cip
            }
        };
        let address = address.trim().to_owned();
        if address.is_empty() {
            return Err(fail("empty address".into()));
        }
        Ok(address)
    }
}

/// Issues the outbound request; the body comes back as an
/// [`crate::events::Event::AddressFetched`].
pub trait AddressFetcher {
    fn fetch(&mut self, provider: AddressProvider);
}

/// Reveals a string one character per timer tick.
#[derive(Debug)]
pub struct Typewriter {
    chars: Vec<char>,
    shown: usize,
    timer: Option<TimerHandle>,
}

impl Typewriter {
    /// Show the first character now and arm the timer for the rest.
    pub fn start(text: &str, sink: &mut dyn TextSink, scheduler: &dyn Scheduler) -> Self {
        let mut writer = Self { chars: text.chars().collect(), shown: 0, timer: None };
        if writer.chars.len() > 1 {
            writer.timer = Some(scheduler.every(TYPEWRITER_INTERVAL_MS, TimerEvent::TypewriterTick));
        }
        writer.tick(sink);
        writer
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.chars.len()
    }

    /// Lengthen the visible prefix by one. No-op once the full text is shown.
    pub fn tick(&mut self, sink: &mut dyn TextSink) {
        if self.is_done() {
            return;
        }
        self.shown += 1;
        let prefix: String = self.chars[..self.shown].iter().collect();
        sink.set_text(&prefix);
        if self.is_done() {
            if let Some(timer) = self.timer.take() {
                timer.cancel();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    Fetching(AddressProvider),
    Revealing(String),
    Unavailable,
}

#[derive(Debug)]
pub struct AddressLookup {
    state: LookupState,
    writer: Option<Typewriter>,
}

impl Default for AddressLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressLookup {
    #[must_use]
    pub fn new() -> Self {
        Self { state: LookupState::Idle, writer: None }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    /// Request the first provider. Only the first call does anything.
    pub fn begin(&mut self, fetcher: &mut dyn AddressFetcher) {
        if self.state != LookupState::Idle {
            return;
        }
        let first = AddressProvider::CHAIN[0];
        self.state = LookupState::Fetching(first);
        fetcher.fetch(first);
    }

    pub fn on_fetched(
        &mut self,
        provider: AddressProvider,
        body: Result<String, EffectError>,
        fetcher: &mut dyn AddressFetcher,
        sink: &mut dyn TextSink,
        scheduler: &dyn Scheduler,
    ) {
        if self.state != LookupState::Fetching(provider) {
            log::debug!("ignoring stale {} response", provider.name());
            return;
        }
        match body.and_then(|b| provider.parse(&b)) {
            Ok(address) => {
                self.writer = Some(Typewriter::start(&address, sink, scheduler));
                self.state = LookupState::Revealing(address);
            }
            Err(err) => {
                log::warn!("{err}");
                if let Some(next) = provider.next() {
                    self.state = LookupState::Fetching(next);
                    fetcher.fetch(next);
                } else {
                    log::info!("visitor address unavailable");
                    self.state = LookupState::Unavailable;
                    sink.set_text(ADDRESS_UNAVAILABLE);
                }
            }
        }
    }

    /// Stop any reveal in progress; the text keeps whatever prefix it shows.
    pub fn halt(&mut self) {
        self.writer = None;
    }

    pub fn on_tick(&mut self, sink: &mut dyn TextSink) {
        if let Some(writer) = self.writer.as_mut() {
            writer.tick(sink);
        }
    }
}
