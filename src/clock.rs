// clock.rs：所有转盘共享的一个节拍器
//
// 不自己起定时器：宿主循环把流逝的时间喂给 advance()，按 tempo 切成固定步长的
// tick 广播给订阅者。没有订阅者时停表，下次订阅时再从零开始计时。

use crate::config::DEFAULT_TEMPO;
use crate::reel::ReelId;
use std::time::Duration;

/// Upper bound on ticks emitted by a single `advance`, so a stalled host
/// loop does not replay seconds of autoplay in one burst.
pub const MAX_CATCH_UP: u32 = 5;

struct Subscriber {
    id: ReelId,
    callback: Box<dyn FnMut()>,
}

pub struct Clock {
    tempo: f64,
    period: Duration,
    accumulator: Duration,
    subscribers: Vec<Subscriber>,
}

impl Clock {
    pub fn new(tempo: f64) -> Self {
        let tempo = if tempo.is_finite() && tempo > 0.0 {
            tempo
        } else {
            DEFAULT_TEMPO
        };
        Self {
            tempo,
            period: Duration::from_secs_f64(1.0 / tempo),
            accumulator: Duration::ZERO,
            subscribers: Vec::new(),
        }
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_tempo(&mut self, tempo: f64) {
        if tempo.is_finite() && tempo > 0.0 && tempo != self.tempo {
            log::debug!("clock tempo {} -> {} ticks/s", self.tempo, tempo);
            self.tempo = tempo;
            self.period = Duration::from_secs_f64(1.0 / tempo);
            self.accumulator = Duration::ZERO;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Register `callback` for every tick. Subscribing an id twice replaces
    /// the earlier callback.
    pub fn subscribe(&mut self, id: ReelId, callback: impl FnMut() + 'static) {
        if !self.is_running() {
            log::debug!("clock started at {} ticks/s", self.tempo);
            self.accumulator = Duration::ZERO;
        }
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
    }

    pub fn unsubscribe(&mut self, id: ReelId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        let removed = self.subscribers.len() != before;

        if removed && self.subscribers.is_empty() {
            log::debug!("clock stopped, no subscribers left");
            self.accumulator = Duration::ZERO;
        }
        removed
    }

    /// Feed wall-clock time into the clock; returns how many ticks fired.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.is_running() {
            return 0;
        }

        self.accumulator += elapsed;
        let mut fired = 0;
        while self.accumulator >= self.period && fired < MAX_CATCH_UP {
            self.accumulator -= self.period;
            self.tick();
            fired += 1;
        }

        if self.accumulator >= self.period {
            log::trace!("clock behind by {:?}, dropping backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        fired
    }

    /// 立即向所有订阅者广播一次
    pub fn tick(&mut self) {
        for subscriber in &mut self.subscribers {
            (subscriber.callback)();
        }
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("tempo", &self.tempo)
            .field("accumulator", &self.accumulator)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
