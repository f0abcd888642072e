//! MAX30100 pulse oximeter and the beat/SpO2 estimator behind it.
//!
//! The chip runs in SpO2 mode at 100 samples/s and buffers up to 16 IR/red
//! pairs in its FIFO.  [`Max30100::service`] must be called often enough to
//! drain it (every loop pass); the estimator then tracks:
//!
//! - **heart rate** from the interval between rising zero crossings of the
//!   DC-removed IR signal, smoothed over beats;
//! - **SpO2** from the ratio of ratios R = (AC/DC)red / (AC/DC)IR over the
//!   last beat, mapped linearly as `110 − 25·R`.
//!
//! Both estimates read `0.0` until a pulse has been tracked, and fall back
//! to `0.0` when the finger is removed or beats stop.

use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::error::{InitError, SensorError};

// ── Registers ─────────────────────────────────────────────────

const REG_FIFO_WR_PTR: u8 = 0x02;
const REG_FIFO_DATA: u8 = 0x05;
const REG_MODE_CONFIG: u8 = 0x06;
const REG_SPO2_CONFIG: u8 = 0x07;
const REG_LED_CONFIG: u8 = 0x09;
const REG_PART_ID: u8 = 0xFF;

const EXPECTED_PART_ID: u8 = 0x11;

const MODE_SPO2: u8 = 0x03;
/// High-resolution ADC, 100 samples/s, 1600 µs pulse width.
const SPO2_HIRES_100HZ_1600US: u8 = 0x47;

/// LED drive current nibbles.
const LED_CURR_7_6MA: u8 = 0x02;
const LED_CURR_27_1MA: u8 = 0x08;

const FIFO_DEPTH: usize = 16;
const BYTES_PER_SAMPLE: usize = 4;

// ── Estimator ─────────────────────────────────────────────────

pub const SAMPLE_PERIOD_MS: u32 = 10;

/// DC tracker coefficient (≈1 s time constant at 100 Hz).
const DC_ALPHA: f32 = 0.01;
/// 200 bpm ceiling.
const MIN_BEAT_INTERVAL_MS: u32 = 300;
/// No beat for this long means the pulse was lost.
const BEAT_TIMEOUT_MS: u32 = 3_000;
/// IR DC level below which no finger is on the sensor.
const FINGER_DC_MIN: f32 = 5_000.0;
/// Minimum IR peak-to-peak swing that counts as a beat.
const MIN_BEAT_SWING: f32 = 20.0;
/// Weight of the newest beat in the heart-rate average.
const HR_SMOOTHING: f32 = 0.25;

#[derive(Debug, Default, Clone, Copy)]
struct Channel {
    dc: f32,
    sq_sum: f32,
}

impl Channel {
    fn update(&mut self, raw: f32) -> f32 {
        self.dc += (raw - self.dc) * DC_ALPHA;
        let ac = raw - self.dc;
        self.sq_sum += ac * ac;
        ac
    }

    /// AC RMS over `n` samples, relative to DC.
    fn perfusion(&self, n: u32) -> f32 {
        if n == 0 || self.dc <= 0.0 {
            return 0.0;
        }
        (self.sq_sum / n as f32).sqrt() / self.dc
    }
}

/// Streaming heart-rate and SpO2 estimator fed with raw FIFO samples.
#[derive(Debug, Default)]
pub struct PulseEstimator {
    ir: Channel,
    red: Channel,
    primed: bool,
    prev_ac: f32,
    swing_min: f32,
    swing_max: f32,
    elapsed_ms: u32,
    since_beat_ms: u32,
    beat_samples: u32,
    seen_beat: bool,
    heart_rate: f32,
    spo2: f32,
}

impl PulseEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ir_raw: u16, red_raw: u16) {
        let (ir_raw, red_raw) = (f32::from(ir_raw), f32::from(red_raw));
        if !self.primed {
            self.ir.dc = ir_raw;
            self.red.dc = red_raw;
            self.primed = true;
        }

        let ac = self.ir.update(ir_raw);
        self.red.update(red_raw);
        self.beat_samples += 1;
        self.since_beat_ms = self.since_beat_ms.saturating_add(SAMPLE_PERIOD_MS);
        self.elapsed_ms = self.elapsed_ms.saturating_add(SAMPLE_PERIOD_MS);
        self.swing_min = self.swing_min.min(ac);
        self.swing_max = self.swing_max.max(ac);

        if self.ir.dc < FINGER_DC_MIN {
            self.lose_pulse();
        } else if self.prev_ac < 0.0 && ac >= 0.0 && self.since_beat_ms >= MIN_BEAT_INTERVAL_MS {
            if self.swing_max - self.swing_min >= MIN_BEAT_SWING {
                self.on_beat();
            }
        } else if self.since_beat_ms >= BEAT_TIMEOUT_MS {
            self.lose_pulse();
        }
        self.prev_ac = ac;
    }

    /// `(spo2 %, heart rate bpm)`, zero while no pulse is tracked.
    pub fn latest(&self) -> (f32, f32) {
        (self.spo2, self.heart_rate)
    }

    fn on_beat(&mut self) {
        if self.seen_beat {
            let instant = 60_000.0 / self.since_beat_ms as f32;
            self.heart_rate = if self.heart_rate == 0.0 {
                instant
            } else {
                self.heart_rate + (instant - self.heart_rate) * HR_SMOOTHING
            };

            let ir = self.ir.perfusion(self.beat_samples);
            if ir > 0.0 {
                let ratio = self.red.perfusion(self.beat_samples) / ir;
                self.spo2 = 110.0 - 25.0 * ratio;
            }
            debug!("beat: hr={:.1} spo2={:.1}", self.heart_rate, self.spo2);
        }
        self.seen_beat = true;
        self.start_window();
    }

    fn lose_pulse(&mut self) {
        if self.seen_beat || self.heart_rate != 0.0 {
            debug!("pulse lost after {} ms", self.elapsed_ms);
        }
        self.seen_beat = false;
        self.heart_rate = 0.0;
        self.spo2 = 0.0;
        self.start_window();
    }

    fn start_window(&mut self) {
        self.since_beat_ms = 0;
        self.beat_samples = 0;
        self.ir.sq_sum = 0.0;
        self.red.sq_sum = 0.0;
        self.swing_min = 0.0;
        self.swing_max = 0.0;
    }
}

// ── Driver ────────────────────────────────────────────────────

pub struct Max30100 {
    addr: u8,
    estimator: PulseEstimator,
}

impl Max30100 {
    pub fn new(addr: u8) -> Self {
        Self {
            addr,
            estimator: PulseEstimator::new(),
        }
    }

    /// Verify the part id and start SpO2 sampling.  Any failure here means
    /// the oximeter is unusable.
    pub fn init<I: I2c>(&mut self, i2c: &mut I) -> Result<(), InitError> {
        let mut id = [0u8];
        i2c.write_read(self.addr, &[REG_PART_ID], &mut id)
            .map_err(|_| InitError::OximeterUnavailable)?;
        if id[0] != EXPECTED_PART_ID {
            log::error!("MAX30100: unexpected part id 0x{:02X}", id[0]);
            return Err(InitError::OximeterUnavailable);
        }

        let setup = [
            (REG_MODE_CONFIG, MODE_SPO2),
            (REG_SPO2_CONFIG, SPO2_HIRES_100HZ_1600US),
            (REG_LED_CONFIG, (LED_CURR_27_1MA << 4) | LED_CURR_7_6MA),
            // Write pointer, overflow counter, read pointer.
            (REG_FIFO_WR_PTR, 0),
            (REG_FIFO_WR_PTR + 1, 0),
            (REG_FIFO_WR_PTR + 2, 0),
        ];
        for (reg, value) in setup {
            i2c.write(self.addr, &[reg, value])
                .map_err(|_| InitError::OximeterUnavailable)?;
        }

        info!("MAX30100: SpO2 mode, 100 Hz, IR 7.6 mA");
        Ok(())
    }

    /// Drain the FIFO into the estimator.  Returns the samples consumed.
    pub fn service<I: I2c>(&mut self, i2c: &mut I) -> Result<usize, SensorError> {
        let mut ptrs = [0u8; 3];
        i2c.write_read(self.addr, &[REG_FIFO_WR_PTR], &mut ptrs)
            .map_err(|_| SensorError::BusFault)?;
        let [wr, overflow, rd] = ptrs;

        let mut pending = usize::from(wr.wrapping_sub(rd) & 0x0F);
        if pending == 0 && overflow > 0 {
            pending = FIFO_DEPTH;
        }
        if pending == 0 {
            return Ok(0);
        }

        let mut buf = [0u8; FIFO_DEPTH * BYTES_PER_SAMPLE];
        let bytes = &mut buf[..pending * BYTES_PER_SAMPLE];
        i2c.write_read(self.addr, &[REG_FIFO_DATA], bytes)
            .map_err(|_| SensorError::BusFault)?;

        for sample in bytes.chunks_exact(BYTES_PER_SAMPLE) {
            let ir = u16::from_be_bytes([sample[0], sample[1]]);
            let red = u16::from_be_bytes([sample[2], sample[3]]);
            self.estimator.push(ir, red);
        }
        Ok(pending)
    }

    /// `(spo2 %, heart rate bpm)`.
    pub fn latest(&self) -> (f32, f32) {
        self.estimator.latest()
    }
}
