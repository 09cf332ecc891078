// src/ambience.rs

//! Synthetic ambience kernels: rain, ocean, forest, wind, fireplace,
//! thunder, birds, crickets, city, cafe, fan, AC, train, airplane.
//!
//! Every kernel is a fixed composition of one-pole filters
//! (`state += coeff * (input - state)`), leaky brown-noise accumulators,
//! phase-accumulated sine oscillators, and exponentially decaying event
//! envelopes re-triggered on randomized timers. Filter coefficients, leak
//! rates, amplitude scales and layer weights are design constants for the
//! intended timbre.

use std::f64::consts::PI;

use crate::catalog::SoundSourceType;
use crate::noise::clip;
use crate::random::GaussianSource;
use crate::sink::SAMPLE_RATE;

const SR: f64 = SAMPLE_RATE as f64;
const DT: f64 = 1.0 / SR;

/// Scheduler for rare events (horn, machine burst, turbulence). The first
/// expiry only schedules the next one, so playback never opens with a
/// transient; later expiries fire and re-arm.
#[derive(Debug, Clone, Copy, Default)]
struct EventTimer {
    countdown: f64,
    armed: bool,
}

impl EventTimer {
    /// Advances one sample. Returns true when an event fires; `next_delay`
    /// supplies the randomized inter-arrival time in seconds.
    fn tick(&mut self, next_delay: impl FnOnce() -> f64) -> bool {
        self.countdown -= DT;
        if self.countdown > 0.0 {
            return false;
        }
        self.countdown = next_delay();
        let fire = self.armed;
        self.armed = true;
        fire
    }
}

/// Filter, oscillator and envelope registers shared by all kernels. Each
/// kernel uses the subset it needs; everything starts at zero so a fresh
/// kernel always begins from the same silence.
#[derive(Debug, Clone, Copy, Default)]
struct KernelState {
    // One-pole low-pass / high-pass chains.
    lp1: f64,
    lp2: f64,
    lp3: f64,
    hp1: f64,
    hp2: f64,
    // Band-pass pair used by the murmur layers.
    bp1: f64,
    bp2: f64,
    // Leaky brown-noise accumulators.
    brown1: f64,
    brown2: f64,
    // Oscillator phases (radians).
    phase1: f64,
    phase2: f64,
    // Modulation clock in seconds (some kernels advance it slower).
    mod_phase: f64,
    // Max-hold/decay envelope follower (fireplace crackle).
    envelope: f64,
    // Randomly timed transient scheduler + its decay envelope.
    drip_timer: f64,
    drip_env: f64,
    // Second scheduler for rarer events (horn, machine burst, turbulence).
    event: EventTimer,
    event_env: f64,
    event_freq: f64,
    sample_count: u64,
}

/// One synthetic ambience voice.
#[derive(Debug)]
pub struct AmbienceKernel {
    source_type: SoundSourceType,
    random: GaussianSource,
    state: KernelState,
}

impl AmbienceKernel {
    pub fn new(source_type: SoundSourceType, random: GaussianSource) -> Self {
        Self {
            source_type,
            random,
            state: KernelState::default(),
        }
    }

    /// Synthesizes one chunk into `buffer`.
    pub fn fill(&mut self, buffer: &mut [i16]) {
        match self.source_type {
            SoundSourceType::SyntheticOcean => self.fill_ocean(buffer),
            SoundSourceType::SyntheticForest => self.fill_forest(buffer),
            SoundSourceType::SyntheticWind => self.fill_wind(buffer),
            SoundSourceType::SyntheticFireplace => self.fill_fireplace(buffer),
            SoundSourceType::SyntheticThunder => self.fill_thunder(buffer),
            SoundSourceType::SyntheticBirds => self.fill_birds(buffer),
            SoundSourceType::SyntheticCrickets => self.fill_crickets(buffer),
            SoundSourceType::SyntheticCity => self.fill_city(buffer),
            SoundSourceType::SyntheticCafe => self.fill_cafe(buffer),
            SoundSourceType::SyntheticFan => self.fill_fan(buffer),
            SoundSourceType::SyntheticAc => self.fill_ac(buffer),
            SoundSourceType::SyntheticTrain => self.fill_train(buffer),
            SoundSourceType::SyntheticAirplane => self.fill_airplane(buffer),
            // Rain is also the fallback for anything unrecognized.
            _ => self.fill_rain(buffer),
        }
    }

    // Rain: steady wash + mid/high patter + sparse bright drip transients.
    fn fill_rain(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.sample_count += 1;
            s.mod_phase += DT;

            // Wash: leaky brown noise with a ~14 s swell.
            s.brown1 += self.random.next_gaussian() * 120.0;
            s.brown1 = s.brown1.clamp(-10_000.0, 10_000.0);
            s.brown1 *= 0.9992;
            let wash_mod = 0.8 + 0.2 * (2.0 * PI * s.mod_phase * 0.07).sin();
            let wash = s.brown1 * wash_mod;

            // Patter: band-passed white noise, two incommensurate intensity sines.
            let white = self.random.next_gaussian() * 2500.0;
            s.lp1 += 0.18 * (white - s.lp1);
            s.hp1 += 0.025 * (s.lp1 - s.hp1);
            let patter = s.lp1 - s.hp1;
            let patter_mod = 0.6
                + 0.25 * (2.0 * PI * s.mod_phase * 0.23).sin()
                + 0.15 * (2.0 * PI * s.mod_phase * 0.37).sin();

            // Drip: 50-400 ms inter-arrival, ~50 ms exponential decay.
            s.drip_timer -= DT;
            if s.drip_timer <= 0.0 {
                s.drip_env = 1.0;
                s.drip_timer = 0.05 + self.random.next_uniform() * 0.35;
            }
            s.drip_env *= 0.9985;
            let drip_noise = self.random.next_gaussian() * 4000.0;
            s.lp2 += 0.35 * (drip_noise - s.lp2);
            let drip = s.lp2 * s.drip_env;

            *sample = clip(wash * 0.40 + patter * patter_mod * 0.45 + drip * 0.15);
        }
    }

    // Ocean: two overlapping wave cycles gating foam and receding hiss over
    // a deep undertow.
    fn fill_ocean(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.sample_count += 1;
            s.mod_phase += DT;

            // Undertow: very slow brown rumble.
            s.brown1 += self.random.next_gaussian() * 100.0;
            s.brown1 = s.brown1.clamp(-8_000.0, 8_000.0);
            s.brown1 *= 0.9997;

            // Wave 1 (~8 s), squared for crest asymmetry; wave 2 (~13 s).
            let wave1_raw = (2.0 * PI * s.mod_phase * 0.125).sin();
            let crest = 0.5 + 0.5 * wave1_raw;
            let wave1 = 0.3 + 0.7 * crest * crest;
            let wave2 = 0.5 + 0.5 * (2.0 * PI * s.mod_phase * 0.077).sin();
            let wave_env = wave1 * 0.65 + wave2 * 0.35;

            // Body: brown noise shaped by the wave envelope.
            s.brown2 += self.random.next_gaussian() * 180.0;
            s.brown2 = s.brown2.clamp(-12_000.0, 12_000.0);
            s.brown2 *= 0.9988;
            let body = s.brown2 * wave_env;

            // Foam appears quadratically above the 0.55 crest threshold.
            let foam_gate = if wave_env > 0.55 {
                (wave_env - 0.55) / 0.45
            } else {
                0.0
            };
            let foam_noise = self.random.next_gaussian() * 2000.0;
            s.lp1 += 0.2 * (foam_noise - s.lp1);
            s.hp1 += 0.04 * (s.lp1 - s.hp1);
            let foam = (s.lp1 - s.hp1) * foam_gate * foam_gate;

            // Receding hiss is loudest between waves.
            let recede_gate = (1.0 - wave_env).clamp(0.0, 1.0) * 0.3;
            let recede_noise = self.random.next_gaussian() * 1200.0;
            s.lp2 += 0.12 * (recede_noise - s.lp2);
            let recede = s.lp2 * recede_gate;

            *sample = clip(s.brown1 * 0.15 + body * 0.45 + foam * 0.28 + recede * 0.12);
        }
    }

    // Forest: heavily low-passed rustle with occasional faint chirps.
    fn fill_forest(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            let white = self.random.next_gaussian() * 1500.0;
            s.lp1 += 0.03 * (white - s.lp1);

            s.mod_phase += 0.05 * DT;
            let rustle_mod = 0.7 + 0.3 * (2.0 * PI * s.mod_phase).sin();

            let chirp = if self.random.next_uniform() < 0.0001 {
                s.phase1.sin() * 2000.0 * self.random.next_uniform()
            } else {
                0.0
            };
            s.phase1 += 2.0 * PI * (2000.0 + self.random.next_gaussian() * 500.0) / SR;

            *sample = clip(s.lp1 * rustle_mod + chirp * 0.3);
            s.sample_count += 1;
        }
    }

    // Wind: variable-cutoff low-pass sweep plus a slower gust envelope.
    fn fill_wind(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            let white = self.random.next_gaussian() * 5000.0;
            s.mod_phase += 0.08 * DT;
            let cutoff = 0.02 + 0.04 * (2.0 * PI * s.mod_phase).sin();
            s.lp1 += cutoff * (white - s.lp1);

            let gust_phase = s.sample_count as f64 / SR * 0.05;
            let gust = 0.5 + 0.5 * (2.0 * PI * gust_phase).sin();

            *sample = clip(s.lp1 * gust);
            s.sample_count += 1;
        }
    }

    // Fireplace: warm roar + dancing flicker + two-tier crackle + ember hiss.
    fn fill_fireplace(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.sample_count += 1;
            s.mod_phase += DT;

            // Roar: steady low brown noise.
            s.brown1 += self.random.next_gaussian() * 80.0;
            s.brown1 = s.brown1.clamp(-6_000.0, 6_000.0);
            s.brown1 *= 0.9994;
            let roar = s.brown1;

            // Flicker: band-passed noise with irregular intensity.
            let mid = self.random.next_gaussian() * 2000.0;
            s.lp1 += 0.08 * (mid - s.lp1);
            s.hp1 += 0.012 * (s.lp1 - s.hp1);
            let flicker = s.lp1 - s.hp1;
            let flicker_mod = 0.5
                + 0.3 * (2.0 * PI * s.mod_phase * 0.4).sin()
                + 0.2 * (2.0 * PI * s.mod_phase * 1.1).sin();

            // Crackle: frequent small pops plus rare big ones, shaped by a
            // max-hold/decay envelope follower.
            let small = if self.random.next_uniform() < 0.003 {
                self.random.next_gaussian() * 4000.0 * (0.3 + self.random.next_uniform() * 0.7)
            } else {
                0.0
            };
            let big = if self.random.next_uniform() < 0.0004 {
                self.random.next_gaussian() * 8000.0
            } else {
                0.0
            };
            let crackle_input = small + big;
            s.envelope = (s.envelope * 0.997).max(crackle_input.abs() / 8000.0);
            s.lp2 += 0.4 * (crackle_input - s.lp2);
            let crackle = s.lp2 * s.envelope;

            // Ember hiss: quiet continuous high band.
            let ember_noise = self.random.next_gaussian() * 600.0;
            s.lp3 += 0.25 * (ember_noise - s.lp3);
            s.hp2 += 0.06 * (s.lp3 - s.hp2);
            let ember = s.lp3 - s.hp2;

            *sample = clip(roar * 0.35 + flicker * flicker_mod * 0.30 + crackle * 0.25 + ember * 0.10);
        }
    }

    // Thunder: heavily low-passed rumble with a ~20 s swell.
    fn fill_thunder(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.brown1 += self.random.next_gaussian() * 200.0;
            s.brown1 = s.brown1.clamp(-14_000.0, 14_000.0);
            s.brown1 *= 0.9995;

            s.lp1 += 0.008 * (s.brown1 - s.lp1);

            s.mod_phase += DT;
            let swell = 0.5 + 0.5 * (2.0 * PI * s.mod_phase * 0.05).sin();

            *sample = clip(s.lp1 * swell);
            s.sample_count += 1;
        }
    }

    // Birds: quiet rustle bed plus FM chirps on a cubed sine envelope.
    fn fill_birds(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            let base = self.random.next_gaussian() * 400.0;
            s.lp1 += 0.05 * (base - s.lp1);

            s.mod_phase += DT;
            let chirp_phase = s.mod_phase * 3.0;
            let raw = (2.0 * PI * chirp_phase).sin() * 0.5 + 0.5;
            let chirp_env = raw * raw * raw;

            s.phase1 += 2.0 * PI * (2500.0 + 1500.0 * (2.0 * PI * chirp_phase * 4.3).sin()) / SR;
            let chirp = s.phase1.sin() * chirp_env * 3000.0;

            *sample = clip(s.lp1 * 0.3 + chirp * 0.7);
            s.sample_count += 1;
        }
    }

    // Crickets: gated ~4.5 kHz carrier pulsing at ~7 Hz over faint noise.
    fn fill_crickets(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.mod_phase += DT;

            let pulse_raw = (2.0 * PI * s.mod_phase * 7.0).sin() * 0.5 + 0.5;
            let pulse = if pulse_raw > 0.3 { 1.0 } else { 0.0 };

            s.phase1 += 2.0 * PI * 4500.0 / SR;
            let carrier = s.phase1.sin() * 2500.0;

            let noise = self.random.next_gaussian() * 200.0;
            s.lp1 += 0.02 * (noise - s.lp1);

            *sample = clip(carrier * pulse * 0.7 + s.lp1 * 0.3);
            s.sample_count += 1;
        }
    }

    // City: rumble + urban hum + a ~12 s doppler-like sweep + rare horn
    // blip + light air hiss.
    fn fill_city(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.sample_count += 1;
            s.mod_phase += DT;

            // Deep traffic rumble.
            s.brown1 += self.random.next_gaussian() * 250.0;
            s.brown1 = s.brown1.clamp(-10_000.0, 10_000.0);
            s.brown1 *= 0.999;
            s.lp1 += 0.01 * (s.brown1 - s.lp1);
            let rumble = s.lp1;

            // Steady mid-band urban hum.
            let hum_noise = self.random.next_gaussian() * 1200.0;
            s.lp2 += 0.06 * (hum_noise - s.lp2);
            s.hp1 += 0.015 * (s.lp2 - s.hp1);
            let hum = s.lp2 - s.hp1;

            // Passing vehicle: band-pass whose cutoff and gain follow a ~12 s
            // cycle, approaching bright and receding dull.
            let pass = 0.5 + 0.5 * (2.0 * PI * s.mod_phase / 12.0).sin();
            let pass_gate = pass * pass;
            let sweep_noise = self.random.next_gaussian() * 1800.0;
            s.lp3 += (0.04 + 0.10 * pass_gate) * (sweep_noise - s.lp3);
            s.hp2 += 0.02 * (s.lp3 - s.hp2);
            let sweep = (s.lp3 - s.hp2) * pass_gate;

            // Rare distant horn with a slight warble.
            if s.event.tick(|| 15.0 + self.random.next_uniform() * 30.0) {
                s.event_env = 1.0;
            }
            s.event_env *= 0.9999;
            s.phase1 += 2.0 * PI * (440.0 + 8.0 * (2.0 * PI * s.mod_phase * 5.0).sin()) / SR;
            let horn = s.phase1.sin() * 6000.0 * s.event_env;

            // Light high-frequency air hiss.
            let air = self.random.next_gaussian() * 500.0;
            s.bp1 += 0.3 * (air - s.bp1);
            s.bp2 += 0.09 * (s.bp1 - s.bp2);
            let hiss = s.bp1 - s.bp2;

            *sample = clip(
                rumble * 0.25 + hum * 0.25 + sweep * 0.25 + horn * 0.10 + hiss * 0.15,
            );
        }
    }

    // Cafe: two-band murmur under irregular modulation + randomized-pitch
    // clinks + rare machine burst + low warmth.
    fn fill_cafe(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.sample_count += 1;
            s.mod_phase += DT;

            // Murmur: two filtered voice bands, blended.
            let white = self.random.next_gaussian() * 2000.0;
            s.bp1 += 0.05 * (white - s.bp1);
            s.bp2 += 0.01 * (s.bp1 - s.bp2);
            let low_voices = s.bp1 - s.bp2;
            let white2 = self.random.next_gaussian() * 1400.0;
            s.lp1 += 0.12 * (white2 - s.lp1);
            s.hp1 += 0.03 * (s.lp1 - s.hp1);
            let high_voices = s.lp1 - s.hp1;
            let murmur = low_voices * 0.6 + high_voices * 0.4;
            // Conversation ebb and flow: two incommensurate slow sines.
            let murmur_mod = 0.7
                + 0.18 * (2.0 * PI * s.mod_phase * 0.31).sin()
                + 0.12 * (2.0 * PI * s.mod_phase * 0.53).sin();

            // Clink: resonant ping at a randomized pitch, fast decay.
            s.drip_timer -= DT;
            if s.drip_timer <= 0.0 {
                s.drip_env = 1.0;
                s.event_freq = 2500.0 + self.random.next_uniform() * 3000.0;
                s.drip_timer = 1.0 + self.random.next_uniform() * 4.0;
            }
            s.drip_env *= 0.999;
            s.phase1 += 2.0 * PI * s.event_freq / SR;
            let clink = s.phase1.sin() * 3500.0 * s.drip_env;

            // Espresso machine: rare broadband burst with a ~2 s decay.
            if s.event.tick(|| 25.0 + self.random.next_uniform() * 35.0) {
                s.event_env = 1.0;
            }
            s.event_env *= 0.99996;
            let burst_noise = self.random.next_gaussian() * 3000.0;
            s.lp3 += 0.22 * (burst_noise - s.lp3);
            let machine = s.lp3 * s.event_env;

            // Warmth: quiet low brown bed.
            s.brown1 += self.random.next_gaussian() * 60.0;
            s.brown1 = s.brown1.clamp(-5_000.0, 5_000.0);
            s.brown1 *= 0.9993;

            *sample = clip(
                murmur * murmur_mod * 0.45 + clink * 0.18 + machine * 0.12 + s.brown1 * 0.25,
            );
        }
    }

    // Fan: motor hum with harmonics plus wobbling air noise.
    fn fill_fan(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.mod_phase += DT;

            s.phase1 += 2.0 * PI * 120.0 / SR;
            let hum = s.phase1.sin() * 1500.0
                + (s.phase1 * 2.0).sin() * 600.0
                + (s.phase1 * 3.0).sin() * 300.0;

            let air = self.random.next_gaussian() * 1500.0;
            s.lp1 += 0.04 * (air - s.lp1);

            let wobble = 1.0 + 0.02 * (2.0 * PI * s.mod_phase * 0.3).sin();

            *sample = clip(hum * 0.3 * wobble + s.lp1 * 0.7);
            s.sample_count += 1;
        }
    }

    // AC: broadband vent noise over a 60 Hz compressor hum, cycling slowly.
    fn fill_ac(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            let air = self.random.next_gaussian() * 2500.0;
            s.lp1 += 0.06 * (air - s.lp1);

            s.phase1 += 2.0 * PI * 60.0 / SR;
            let hum = s.phase1.sin() * 800.0;

            s.mod_phase += 0.02 * DT;
            let cycle = 0.9 + 0.1 * (2.0 * PI * s.mod_phase).sin();

            *sample = clip((s.lp1 * 0.85 + hum * 0.15) * cycle);
            s.sample_count += 1;
        }
    }

    // Train: wheel rumble + rhythmic double clack + body sway + detuned
    // steel hum + air rush.
    fn fill_train(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.sample_count += 1;
            s.mod_phase += DT;

            // Wheel rumble.
            s.brown1 += self.random.next_gaussian() * 200.0;
            s.brown1 = s.brown1.clamp(-10_000.0, 10_000.0);
            s.brown1 *= 0.999;

            // Double clack: two sub-pulses per 1.1 Hz bogie cycle, the second
            // trailing the first by a tenth of a cycle.
            let cycle = s.mod_phase * 1.1;
            let pulse = |at: f64| -> f64 {
                let v = (2.0 * PI * (cycle - at)).sin();
                if v > 0.92 {
                    (v - 0.92) / 0.08
                } else {
                    0.0
                }
            };
            let clack_env = pulse(0.0) + pulse(0.1) * 0.8;
            let clack_noise = self.random.next_gaussian() * 5000.0 * clack_env;
            s.lp1 += 0.15 * (clack_noise - s.lp1);
            let clack = s.lp1;

            // Body sway: second brown layer breathing over ~12 s.
            s.brown2 += self.random.next_gaussian() * 90.0;
            s.brown2 = s.brown2.clamp(-7_000.0, 7_000.0);
            s.brown2 *= 0.9994;
            let sway = s.brown2 * (0.8 + 0.2 * (2.0 * PI * s.mod_phase * 0.08).sin());

            // Steel hum: detuned harmonic stack around 220 Hz.
            s.phase1 += 2.0 * PI * 220.0 / SR;
            let steel = (s.phase1.sin() * 0.5
                + (s.phase1 * 1.5).sin() * 0.3
                + (s.phase1 * 2.01).sin() * 0.2)
                * 1200.0;

            // Air rush past the windows.
            let rush_noise = self.random.next_gaussian() * 1500.0;
            s.lp2 += 0.3 * (rush_noise - s.lp2);
            s.hp1 += 0.08 * (s.lp2 - s.hp1);
            let rush = s.lp2 - s.hp1;

            *sample = clip(
                s.brown1 * 0.25 + clack * 0.25 + sway * 0.15 + steel * 0.15 + rush * 0.20,
            );
        }
    }

    // Airplane: detuned five-harmonic drone + cabin roar + pressurization
    // hiss + fuselage vibration + rare turbulence bumps.
    fn fill_airplane(&mut self, buffer: &mut [i16]) {
        let s = &mut self.state;
        for sample in buffer.iter_mut() {
            s.sample_count += 1;
            s.mod_phase += DT;

            // Engine drone with slow RPM drift.
            let drift = 1.0 + 0.01 * (2.0 * PI * s.mod_phase * 0.05).sin();
            s.phase1 += 2.0 * PI * 85.0 * drift / SR;
            let drone = (s.phase1.sin()
                + (s.phase1 * 1.99).sin() * 0.6
                + (s.phase1 * 3.02).sin() * 0.4
                + (s.phase1 * 4.01).sin() * 0.25
                + (s.phase1 * 5.03).sin() * 0.15)
                * 1500.0;

            // Cabin roar: two cascaded low-pass stages.
            let roar_noise = self.random.next_gaussian() * 4000.0;
            s.lp1 += 0.04 * (roar_noise - s.lp1);
            s.lp2 += 0.02 * (s.lp1 - s.lp2);
            let roar = s.lp2;

            // Pressurization hiss.
            let hiss_noise = self.random.next_gaussian() * 900.0;
            s.lp3 += 0.3 * (hiss_noise - s.lp3);
            s.hp1 += 0.1 * (s.lp3 - s.hp1);
            let hiss = s.lp3 - s.hp1;

            // Fuselage vibration: deep slow brown layer.
            s.brown1 += self.random.next_gaussian() * 150.0;
            s.brown1 = s.brown1.clamp(-8_000.0, 8_000.0);
            s.brown1 *= 0.9995;

            // Turbulence: rare low-frequency bump with a slow decay.
            if s.event.tick(|| 20.0 + self.random.next_uniform() * 40.0) {
                s.event_env = 1.0;
            }
            s.event_env *= 0.99996;
            s.brown2 += self.random.next_gaussian() * 180.0;
            s.brown2 = s.brown2.clamp(-9_000.0, 9_000.0);
            s.brown2 *= 0.9991;
            let turbulence = s.brown2 * s.event_env;

            *sample = clip(
                drone * 0.20 + roar * 0.30 + hiss * 0.12 + s.brown1 * 0.25 + turbulence * 0.13,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CHUNK_SIZE;

    const ALL_AMBIENCES: [SoundSourceType; 14] = [
        SoundSourceType::SyntheticRain,
        SoundSourceType::SyntheticOcean,
        SoundSourceType::SyntheticForest,
        SoundSourceType::SyntheticWind,
        SoundSourceType::SyntheticFireplace,
        SoundSourceType::SyntheticThunder,
        SoundSourceType::SyntheticBirds,
        SoundSourceType::SyntheticCrickets,
        SoundSourceType::SyntheticCity,
        SoundSourceType::SyntheticCafe,
        SoundSourceType::SyntheticFan,
        SoundSourceType::SyntheticAc,
        SoundSourceType::SyntheticTrain,
        SoundSourceType::SyntheticAirplane,
    ];

    #[test]
    fn every_ambience_produces_sound() {
        for source in ALL_AMBIENCES {
            let mut kernel = AmbienceKernel::new(source, GaussianSource::seeded(5));
            let mut chunk = vec![0i16; CHUNK_SIZE];
            // A few chunks so slow envelopes have time to open up.
            for _ in 0..4 {
                kernel.fill(&mut chunk);
            }
            let energy: i64 = chunk.iter().map(|&s| (s as i64).abs()).sum();
            assert!(energy > 0, "{:?} produced silence", source);
        }
    }

    #[test]
    fn seeded_kernels_are_deterministic() {
        for source in ALL_AMBIENCES {
            let mut a = AmbienceKernel::new(source, GaussianSource::seeded(31));
            let mut b = AmbienceKernel::new(source, GaussianSource::seeded(31));
            let mut chunk_a = vec![0i16; CHUNK_SIZE];
            let mut chunk_b = vec![0i16; CHUNK_SIZE];
            for _ in 0..3 {
                a.fill(&mut chunk_a);
                b.fill(&mut chunk_b);
            }
            assert_eq!(chunk_a, chunk_b, "{:?}", source);
        }
    }

    #[test]
    fn output_does_not_saturate_continuously() {
        // Layer weights sum to roughly 1.0; sustained full-scale output
        // would mean a runaway accumulator somewhere.
        for source in ALL_AMBIENCES {
            let mut kernel = AmbienceKernel::new(source, GaussianSource::seeded(77));
            let mut chunk = vec![0i16; CHUNK_SIZE];
            let mut clipped = 0usize;
            let mut total = 0usize;
            for _ in 0..16 {
                kernel.fill(&mut chunk);
                clipped += chunk
                    .iter()
                    .filter(|&&s| s == i16::MAX || s == i16::MIN)
                    .count();
                total += chunk.len();
            }
            assert!(
                clipped < total / 20,
                "{:?} clipped {}/{} samples",
                source,
                clipped,
                total
            );
        }
    }

    #[test]
    fn rare_event_scheduler_skips_the_startup_expiry() {
        let mut timer = EventTimer::default();
        // The countdown starts at zero; the first expiry must arm, not fire,
        // so city/cafe/airplane playback never opens with a horn, burst or
        // turbulence bump.
        assert!(!timer.tick(|| 1.0));

        let mut fired_at = None;
        for i in 1..(2 * SAMPLE_RATE as usize) {
            if timer.tick(|| 1.0) {
                fired_at = Some(i);
                break;
            }
        }
        let fired_at = fired_at.expect("armed event never fired");
        let one_second = SAMPLE_RATE as usize;
        assert!(
            (one_second - 2..=one_second + 2).contains(&fired_at),
            "fired at sample {}",
            fired_at
        );
    }

    #[test]
    fn noise_tag_falls_back_to_rain() {
        let mut fallback =
            AmbienceKernel::new(SoundSourceType::NoiseWhite, GaussianSource::seeded(8));
        let mut rain =
            AmbienceKernel::new(SoundSourceType::SyntheticRain, GaussianSource::seeded(8));
        let mut chunk_a = vec![0i16; 512];
        let mut chunk_b = vec![0i16; 512];
        fallback.fill(&mut chunk_a);
        rain.fill(&mut chunk_b);
        assert_eq!(chunk_a, chunk_b);
    }
}
