/// A handle on one lamp: color intents in, minimal commands out.
///
/// Every operation runs to completion (filter → send → merge) before
/// returning. The handle is single-owner; drive several lamps concurrently by
/// giving each its own thread or blocking task.

use crate::coalesce::{filter, resulting_color_mode};
use crate::command::Command;
use crate::convert::{Rgb, convert};
use crate::error::Result;
use crate::profile::FixtureProfile;
use crate::state::FixtureState;
use crate::transport::{Transport, TransportError};

pub struct Fixture<T: Transport> {
    transport: T,
    id: String,
    name: String,
    profile: FixtureProfile,
    state: FixtureState,
}

impl<T: Transport> Fixture<T> {
    /// Query the lamp once and seed the tracked state from its answer.
    pub fn open(transport: T, id: impl Into<String>, profile: FixtureProfile) -> Result<Self> {
        let id = id.into();
        let info = transport.query(&id)?;
        if !info.state.reachable {
            log::warn!("Light {id} ({}) is not reachable by the bridge", info.name);
        }
        let state = FixtureState::from_snapshot(&info.state, profile.default_transition_time);
        log::info!(
            "Opened light {id} \"{}\": on={} bri={} mode={}",
            info.name,
            state.on,
            state.brightness,
            state.color_mode
        );
        Ok(Self {
            transport,
            id,
            name: info.name,
            profile,
            state,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &FixtureState {
        &self.state
    }

    pub fn profile(&self) -> &FixtureProfile {
        &self.profile
    }

    /// Default fade for commands that don't specify one, in deciseconds.
    pub fn set_transition_time(&mut self, deciseconds: u16) {
        self.state.transition_time = deciseconds;
    }

    /// Throw away tracked state and re-read it from the bridge.
    pub fn refresh_state(&mut self) -> Result<()> {
        let info = self.transport.query(&self.id)?;
        self.name = info.name;
        self.state.replace(&info.state);
        log::debug!("Resynced light {}: {:?}", self.id, self.state);
        Ok(())
    }

    /// Filter `desired` against the tracked state and send what remains.
    /// Returns the command that was accepted, or `None` if nothing was sent.
    pub fn send_command(&mut self, desired: Command) -> Result<Option<Command>> {
        let Some(mut cmd) = filter(&desired, &self.state, self.profile.implicit_transition_time)
        else {
            log::debug!("Light {}: nothing to send", self.id);
            return Ok(None);
        };

        log::debug!("Light {}: sending {cmd}", self.id);
        match self.transport.send(&self.id, &cmd) {
            Ok(()) => {}
            Err(TransportError::PoweredOff { .. }) => {
                // We believed it was on; someone switched it off behind our back.
                log::warn!("Light {} was off unexpectedly, forcing on", self.id);
                cmd.on = Some(true);
                self.transport.send(&self.id, &cmd)?;
            }
            Err(e) => return Err(e.into()),
        }

        let mode = resulting_color_mode(&cmd, self.state.color_mode);
        self.state.merge(&cmd, mode);
        Ok(Some(cmd))
    }

    /// Fade to an RGB color. Brightness follows the color's luminance.
    pub fn send_color(&mut self, rgb: Rgb, transition_time: Option<u16>) -> Result<Option<Command>> {
        let rgb = if rgb.is_normalized() {
            rgb
        } else {
            log::warn!("Light {}: RGB {rgb:?} out of range, clamping (NaN as 0)", self.id);
            rgb.clamped()
        };

        let sample = convert(rgb, &self.profile.gamut, self.profile.gamma_correct);
        // 255 is past the protocol max of 254; the bridge coerces it.
        let bri = (sample.luminance * 255.0).round() as u8;

        self.send_command(
            Command::new()
                .with_bri(bri)
                .with_xy(sample.xy)
                .with_transition_time(transition_time),
        )
    }

    /// Fade to a white point. `t` in [0, 1], higher is cooler.
    pub fn send_color_temperature(
        &mut self,
        t: f64,
        transition_time: Option<u16>,
    ) -> Result<Option<Command>> {
        let t = self.unit(t, "color temperature");
        let ct = self.profile.ct_range.mireds(t);
        self.send_command(Command::new().with_ct(ct).with_transition_time(transition_time))
    }

    /// Fade to a brightness in [0, 1]. Zero switches the lamp off.
    pub fn send_brightness(&mut self, b: f64, transition_time: Option<u16>) -> Result<Option<Command>> {
        let b = self.unit(b, "brightness");
        let bri = (b * 255.0).round() as u8;
        self.send_command(Command::new().with_bri(bri).with_transition_time(transition_time))
    }

    pub fn turn_off(&mut self) -> Result<Option<Command>> {
        self.send_command(Command::new().with_on(false))
    }

    fn unit(&self, value: f64, what: &str) -> f64 {
        if value.is_nan() {
            log::warn!("Light {}: {what} is NaN, using 0", self.id);
            return 0.0;
        }
        if !(0.0..=1.0).contains(&value) {
            log::warn!("Light {}: {what} {value} out of range, clamping", self.id);
        }
        value.clamp(0.0, 1.0)
    }
}
