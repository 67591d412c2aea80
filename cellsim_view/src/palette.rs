// palette.rs - Maps cell values to colors

use cellsim::{Cell, RuleId};
use egui::Color32;

/// Color for one cell, or `None` to leave the background showing.
///
/// Binary rules use the single live color; the infection rule fades red with
/// the infection level; the blur rule fades blue with the cell value; other
/// multi-state rules spread their states around the hue wheel.
pub fn cell_color(
    state: Cell,
    rule: RuleId,
    total_states: u32,
    max_states: u32,
    live: Color32,
) -> Option<Color32> {
    if state == 0.0 {
        return None;
    }
    if rule.is_continuous() {
        return Some(Color32::from_rgba_unmultiplied(0, 0, 255, unit_to_byte(state)));
    }
    if total_states == 2 {
        return Some(live);
    }
    if rule == RuleId::Infection {
        let intensity = state / f64::from(max_states.saturating_sub(1).max(1));
        return Some(Color32::from_rgba_unmultiplied(255, 0, 0, unit_to_byte(intensity)));
    }
    let hue = (state - 1.0) * (360.0 / f64::from(total_states.saturating_sub(1).max(1)));
    Some(hsl(hue, 1.0, 0.5))
}

fn unit_to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// HSL to an opaque color. Hue in degrees, saturation and lightness in `[0, 1]`.
pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> Color32 {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    Color32::from_rgb(unit_to_byte(r + m), unit_to_byte(g + m), unit_to_byte(b + m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim::LifeVariant;

    const LIVE: Color32 = Color32::from_rgb(1, 2, 3);

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl(120.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl(240.0, 1.0, 0.5), Color32::from_rgb(0, 0, 255));
        assert_eq!(hsl(360.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl(0.0, 0.0, 1.0), Color32::WHITE);
    }

    #[test]
    fn test_zero_is_background() {
        for rule in RuleId::ALL {
            assert_eq!(cell_color(0.0, rule, 2, 50, LIVE), None);
        }
    }

    #[test]
    fn test_binary_rules_use_live_color() {
        let rule = RuleId::Life(LifeVariant::Life);
        assert_eq!(cell_color(1.0, rule, 2, 50, LIVE), Some(LIVE));
    }

    #[test]
    fn test_multi_state_hues() {
        // State 1 of Brian's Brain sits at hue 0, state 2 at hue 180.
        assert_eq!(
            cell_color(1.0, RuleId::BriansBrain, 3, 50, LIVE),
            Some(Color32::from_rgb(255, 0, 0))
        );
        assert_eq!(
            cell_color(2.0, RuleId::BriansBrain, 3, 50, LIVE),
            Some(Color32::from_rgb(0, 255, 255))
        );
    }

    #[test]
    fn test_infection_and_blur_fade() {
        let full = cell_color(49.0, RuleId::Infection, 50, 50, LIVE).unwrap();
        assert_eq!(full, Color32::from_rgba_unmultiplied(255, 0, 0, 255));
        let blur = cell_color(0.5, RuleId::Blur, 2, 50, LIVE).unwrap();
        assert_eq!(blur, Color32::from_rgba_unmultiplied(0, 0, 255, 128));
    }
}
