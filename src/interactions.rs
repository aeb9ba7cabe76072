use serde::{Deserialize, Serialize};

pub const REVEAL_STAGGER_STEP_SECONDS: f64 = 0.06;
pub const REVEAL_STAGGER_CAP_SECONDS: f64 = 0.45;
pub const SKILL_LEVEL_MAX: u32 = 100;
pub const FILTER_WILDCARD: &str = "all";
pub const RIPPLE_SIZE_FACTOR: f64 = 1.6;
pub const PARALLAX_SHIFT_PX: f64 = 6.0;
pub const PARALLAX_ROTATE_DEG: f64 = 1.2;
pub const TILT_ROTATE_DEG: f64 = 6.0;
pub const TILT_PERSPECTIVE_PX: f64 = 800.0;
pub const TILT_LIFT_PX: f64 = 6.0;
pub const TILT_IMAGE_SCALE: f64 = 1.05;
pub const TILT_IMAGE_ROTATE_DEG: f64 = 0.6;

/// Entrance delay for the n-th revealable element of its container, capped so
/// long sections do not trail forever.
pub fn stagger_delay_seconds(index: usize) -> f64 {
    (REVEAL_STAGGER_STEP_SECONDS * index as f64).min(REVEAL_STAGGER_CAP_SECONDS)
}

/// Declared fill level of a skill bar. Missing or unparseable markup counts
/// as an empty bar rather than an error.
pub fn parse_skill_level(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(0)
        .min(SKILL_LEVEL_MAX)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FilterAction {
    Show,
    Hide,
}

pub fn filter_action(selected: &str, category: Option<&str>) -> FilterAction {
    if selected == FILTER_WILDCARD || category == Some(selected) {
        FilterAction::Show
    } else {
        FilterAction::Hide
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RippleGeometry {
    pub diameter: f64,
    pub left: f64,
    pub top: f64,
}

/// Circle sized to flood the control from the click point, positioned so it
/// is centered on the pointer in the control's local coordinates.
pub fn ripple_geometry(
    width: f64,
    height: f64,
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> RippleGeometry {
    let diameter = width.max(height) * RIPPLE_SIZE_FACTOR;

    RippleGeometry {
        diameter,
        left: client_x - rect_left - diameter / 2.0,
        top: client_y - rect_top - diameter / 2.0,
    }
}

/// Pointer position inside a bounding box, normalized to [-0.5, 0.5] on each
/// axis with (0, 0) at the center. Degenerate boxes report the center.
pub fn pointer_offsets(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
    width: f64,
    height: f64,
) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }

    (
        (client_x - rect_left) / width - 0.5,
        (client_y - rect_top) / height - 0.5,
    )
}

pub fn parallax_transform(px: f64, py: f64) -> String {
    format!(
        "translate3d({:.2}px, {:.2}px, 0) rotate({:.2}deg)",
        px * PARALLAX_SHIFT_PX,
        py * -PARALLAX_SHIFT_PX,
        px * PARALLAX_ROTATE_DEG
    )
}

pub fn tilt_transform(x: f64, y: f64) -> String {
    format!(
        "perspective({:.0}px) rotateX({:.2}deg) rotateY({:.2}deg) translateZ({:.0}px)",
        TILT_PERSPECTIVE_PX,
        -y * TILT_ROTATE_DEG,
        x * TILT_ROTATE_DEG,
        TILT_LIFT_PX
    )
}

pub fn tilt_image_transform(x: f64) -> String {
    format!(
        "scale({TILT_IMAGE_SCALE}) translateZ(0) rotate({:.2}deg)",
        x * TILT_IMAGE_ROTATE_DEG
    )
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Trimmed contact payload, or `None` when any required field is empty.
/// `None` means the submission must not reach the network.
pub fn normalized_contact(name: &str, email: &str, message: &str) -> Option<ContactPayload> {
    let name = name.trim();
    let email = email.trim();
    let message = message.trim();

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return None;
    }

    Some(ContactPayload {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    })
}

pub fn nav_link_selector(section_id: &str) -> String {
    format!(".nav-list a[href=\"#{section_id}\"]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_delay_grows_with_document_order() {
        let delays = (0..12).map(stagger_delay_seconds).collect::<Vec<_>>();

        for pair in delays.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(delays[0], 0.0);
        assert_eq!(delays[1], 0.06);
    }

    #[test]
    fn stagger_delay_never_exceeds_cap() {
        assert_eq!(stagger_delay_seconds(8), 0.45);
        assert_eq!(stagger_delay_seconds(100), 0.45);
        assert_eq!(stagger_delay_seconds(usize::MAX), 0.45);
    }

    #[test]
    fn skill_level_defaults_to_zero_without_usable_markup() {
        assert_eq!(parse_skill_level(None), 0);
        assert_eq!(parse_skill_level(Some("")), 0);
        assert_eq!(parse_skill_level(Some("ninety")), 0);
        assert_eq!(parse_skill_level(Some("-4")), 0);
    }

    #[test]
    fn skill_level_reads_declared_percent_and_clamps() {
        assert_eq!(parse_skill_level(Some("92")), 92);
        assert_eq!(parse_skill_level(Some(" 60 ")), 60);
        assert_eq!(parse_skill_level(Some("150")), 100);
    }

    #[test]
    fn wildcard_filter_shows_every_category() {
        assert_eq!(filter_action("all", Some("web")), FilterAction::Show);
        assert_eq!(filter_action("all", Some("design")), FilterAction::Show);
        assert_eq!(filter_action("all", None), FilterAction::Show);
    }

    #[test]
    fn category_filter_matches_exact_tags_only() {
        let categories = [Some("web"), Some("design"), Some("web")];
        let actions = categories
            .iter()
            .map(|category| filter_action("web", *category))
            .collect::<Vec<_>>();

        assert_eq!(
            actions,
            vec![FilterAction::Show, FilterAction::Hide, FilterAction::Show]
        );
        assert_eq!(filter_action("web", None), FilterAction::Hide);
        assert_eq!(filter_action("web", Some("webinar")), FilterAction::Hide);
    }

    #[test]
    fn ripple_diameter_uses_largest_dimension() {
        let geometry = ripple_geometry(200.0, 48.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(geometry.diameter, 320.0);

        let tall = ripple_geometry(48.0, 200.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(tall.diameter, 320.0);
    }

    #[test]
    fn ripple_is_centered_on_the_click_point() {
        let geometry = ripple_geometry(100.0, 40.0, 130.0, 220.0, 100.0, 200.0);

        assert_eq!(geometry.left + geometry.diameter / 2.0, 30.0);
        assert_eq!(geometry.top + geometry.diameter / 2.0, 20.0);
    }

    #[test]
    fn pointer_offsets_span_half_unit_in_each_direction() {
        assert_eq!(pointer_offsets(0.0, 0.0, 0.0, 0.0, 200.0, 100.0), (-0.5, -0.5));
        assert_eq!(pointer_offsets(200.0, 100.0, 0.0, 0.0, 200.0, 100.0), (0.5, 0.5));
        assert_eq!(pointer_offsets(100.0, 50.0, 0.0, 0.0, 200.0, 100.0), (0.0, 0.0));
    }

    #[test]
    fn pointer_offsets_treat_degenerate_boxes_as_centered() {
        assert_eq!(pointer_offsets(10.0, 10.0, 0.0, 0.0, 0.0, 100.0), (0.0, 0.0));
        assert_eq!(pointer_offsets(10.0, 10.0, 0.0, 0.0, 100.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn parallax_transform_shifts_against_vertical_pointer_motion() {
        assert_eq!(
            parallax_transform(0.5, 0.5),
            "translate3d(3.00px, -3.00px, 0) rotate(0.60deg)"
        );
        assert_eq!(
            parallax_transform(-0.5, -0.5),
            "translate3d(-3.00px, 3.00px, 0) rotate(-0.60deg)"
        );
    }

    #[test]
    fn tilt_transform_rotates_toward_the_pointer() {
        assert_eq!(
            tilt_transform(0.5, -0.5),
            "perspective(800px) rotateX(3.00deg) rotateY(3.00deg) translateZ(6px)"
        );
        assert_eq!(tilt_image_transform(0.5), "scale(1.05) translateZ(0) rotate(0.30deg)");
    }

    #[test]
    fn contact_fields_are_trimmed_before_validation() {
        let payload =
            normalized_contact("  Ana  ", " a@x.com ", " hi ").expect("payload should validate");

        assert_eq!(payload.name, "Ana");
        assert_eq!(payload.email, "a@x.com");
        assert_eq!(payload.message, "hi");
    }

    #[test]
    fn contact_with_blank_required_field_never_validates() {
        assert!(normalized_contact("Ana", "a@x.com", "   ").is_none());
        assert!(normalized_contact("", "a@x.com", "hi").is_none());
        assert!(normalized_contact("Ana", "\t", "hi").is_none());
    }

    #[test]
    fn nav_link_selector_targets_the_section_anchor() {
        assert_eq!(nav_link_selector("skills"), ".nav-list a[href=\"#skills\"]");
    }
}
