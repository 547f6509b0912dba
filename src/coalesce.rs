/// Command coalescing: reduce a desired command to the smallest delta the
/// lamp actually needs, given what we last knew about it.
///
/// Keeps traffic on the Zigbee side of the bridge down and works around the
/// lamp quirks:
///   - bri 0 means "switch off" and overrides everything else
///   - any other command implicitly switches the lamp on
///   - xy wins over ct when both are given
///   - the bridge default fade is not worth sending

use crate::command::Command;
use crate::state::{ColorMode, FixtureState};

/// Filter `desired` against `state`. Returns `None` when nothing needs to be
/// sent. The configured fade comes from `state.transition_time`;
/// `implicit_transition_time` is what the lamp does when none is sent.
pub fn filter(
    desired: &Command,
    state: &FixtureState,
    implicit_transition_time: u16,
) -> Option<Command> {
    let mut cmd = Command::new();

    // An explicit `on: false` is treated the same as brightness zero.
    if desired.bri == Some(0) || desired.on == Some(false) {
        if !state.on {
            return None;
        }
        return Some(Command::new().with_on(false));
    }

    if let Some(bri) = desired.bri.filter(|&bri| bri != state.brightness) {
        cmd.bri = Some(bri);
    }

    if !state.on {
        cmd.on = Some(true);
    }

    let fade = desired.transitiontime.unwrap_or(state.transition_time);
    if fade != implicit_transition_time {
        cmd.transitiontime = Some(fade);
    }

    cmd.xy = desired.xy;
    cmd.ct = if desired.xy.is_some() { None } else { desired.ct };

    if cmd.xy == Some(state.chromaticity) && state.color_mode == ColorMode::Xy {
        cmd.xy = None;
    }
    if cmd.ct == Some(state.color_temperature) && state.color_mode == ColorMode::Ct {
        cmd.ct = None;
    }

    cmd.is_effective().then_some(cmd)
}

/// Color mode the lamp ends up in after `sent` is applied.
pub fn resulting_color_mode(sent: &Command, current: ColorMode) -> ColorMode {
    if sent.xy.is_some() {
        ColorMode::Xy
    } else if sent.ct.is_some() {
        ColorMode::Ct
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;

    const IMPLICIT: u16 = 4;

    fn state(on: bool, color_mode: ColorMode) -> FixtureState {
        FixtureState {
            on,
            brightness: 100,
            chromaticity: Point2::new(0.4, 0.4),
            color_temperature: 300,
            color_mode,
            transition_time: 4,
        }
    }

    #[test]
    fn bri_zero_turns_off_and_drops_everything_else() {
        let desired = Command::new()
            .with_bri(0)
            .with_xy(Point2::new(0.3, 0.3))
            .with_transition_time(Some(20));
        let out = filter(&desired, &state(true, ColorMode::Xy), IMPLICIT);
        assert_eq!(out, Some(Command::new().with_on(false)));
    }

    #[test]
    fn bri_zero_when_already_off_is_noop() {
        let desired = Command::new().with_bri(0);
        assert_eq!(filter(&desired, &state(false, ColorMode::Xy), IMPLICIT), None);
    }

    #[test]
    fn unchanged_brightness_is_dropped() {
        let s = state(true, ColorMode::Xy);
        assert_eq!(filter(&Command::new().with_bri(100), &s, IMPLICIT), None);
        assert_eq!(
            filter(&Command::new().with_bri(101), &s, IMPLICIT),
            Some(Command::new().with_bri(101))
        );
    }

    #[test]
    fn off_lamp_is_switched_on() {
        let out = filter(&Command::new().with_bri(100), &state(false, ColorMode::Ct), IMPLICIT);
        // Brightness is unchanged, but the lamp still needs to come on.
        assert_eq!(out, Some(Command::new().with_on(true)));
    }

    #[test]
    fn transition_time_default_is_suppressed() {
        let s = state(true, ColorMode::Ct);
        let desired = Command::new().with_ct(250).with_transition_time(Some(4));
        assert_eq!(filter(&desired, &s, IMPLICIT), Some(Command::new().with_ct(250)));

        let desired = Command::new().with_ct(250).with_transition_time(Some(0));
        assert_eq!(
            filter(&desired, &s, IMPLICIT),
            Some(Command::new().with_ct(250).with_transition_time(Some(0)))
        );
    }

    #[test]
    fn configured_transition_time_is_used_when_none_given() {
        let mut s = state(true, ColorMode::Ct);
        s.transition_time = 15;
        let out = filter(&Command::new().with_ct(250), &s, IMPLICIT);
        assert_eq!(out, Some(Command::new().with_ct(250).with_transition_time(Some(15))));
    }

    #[test]
    fn transition_time_alone_is_noop() {
        let mut s = state(true, ColorMode::Ct);
        s.transition_time = 15;
        let desired = Command::new().with_ct(300);
        assert_eq!(filter(&desired, &s, IMPLICIT), None);
    }

    #[test]
    fn xy_wins_over_ct() {
        let desired = Command::new().with_xy(Point2::new(0.3, 0.3)).with_ct(200);
        let out = filter(&desired, &state(true, ColorMode::Ct), IMPLICIT).unwrap();
        assert_eq!(out.xy, Some(Point2::new(0.3, 0.3)));
        assert_eq!(out.ct, None);
    }

    #[test]
    fn unchanged_xy_in_xy_mode_is_noop() {
        let desired = Command::new().with_xy(Point2::new(0.4, 0.4));
        assert_eq!(filter(&desired, &state(true, ColorMode::Xy), IMPLICIT), None);
    }

    #[test]
    fn unchanged_xy_in_ct_mode_is_resent() {
        let desired = Command::new().with_xy(Point2::new(0.4, 0.4));
        let out = filter(&desired, &state(true, ColorMode::Ct), IMPLICIT);
        assert_eq!(out, Some(desired));
    }

    #[test]
    fn unchanged_ct_in_ct_mode_is_noop() {
        let desired = Command::new().with_ct(300);
        assert_eq!(filter(&desired, &state(true, ColorMode::Ct), IMPLICIT), None);
        let out = filter(&desired, &state(true, ColorMode::Xy), IMPLICIT);
        assert_eq!(out, Some(desired));
    }

    #[test]
    fn off_lamp_in_ct_mode_gets_color_and_power() {
        let red = Point2::new(0.675, 0.322);
        let desired = Command::new().with_bri(72).with_xy(red);
        let out = filter(&desired, &state(false, ColorMode::Ct), IMPLICIT).unwrap();
        assert_eq!(out.on, Some(true));
        assert_eq!(out.xy, Some(red));
        assert_eq!(out.ct, None);
        assert_eq!(out.bri, Some(72));
    }

    #[test]
    fn second_identical_request_is_noop_after_merge() {
        let mut s = state(true, ColorMode::Ct);
        let desired = Command::new().with_bri(200).with_xy(Point2::new(0.21, 0.33));

        let sent = filter(&desired, &s, IMPLICIT).unwrap();
        s.merge(&sent, resulting_color_mode(&sent, s.color_mode));

        assert_eq!(s.color_mode, ColorMode::Xy);
        assert_eq!(filter(&desired, &s, IMPLICIT), None);
    }

    #[test]
    fn explicit_power_requests() {
        let off = Command::new().with_on(false);
        let on = Command::new().with_on(true);
        assert_eq!(filter(&off, &state(true, ColorMode::Xy), IMPLICIT), Some(off));
        assert_eq!(filter(&off, &state(false, ColorMode::Xy), IMPLICIT), None);
        assert_eq!(filter(&on, &state(true, ColorMode::Xy), IMPLICIT), None);
        assert_eq!(filter(&on, &state(false, ColorMode::Xy), IMPLICIT), Some(on));
    }

    #[test]
    fn resulting_mode_follows_sent_channel() {
        let xy = Command::new().with_xy(Point2::new(0.3, 0.3));
        let ct = Command::new().with_ct(300);
        let bri = Command::new().with_bri(3);
        assert_eq!(resulting_color_mode(&xy, ColorMode::Ct), ColorMode::Xy);
        assert_eq!(resulting_color_mode(&ct, ColorMode::Xy), ColorMode::Ct);
        assert_eq!(resulting_color_mode(&bri, ColorMode::Other), ColorMode::Other);
    }
}
