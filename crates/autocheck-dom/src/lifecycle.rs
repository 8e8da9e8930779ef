//! Custom Element Lifecycle
//!
//! Callbacks a host invokes on an autonomous custom element.

/// An element the host attaches to and detaches from its tree
pub trait CustomElement {
    /// Tag name the element is defined under
    const NAME: &'static str;

    /// Attributes whose changes are reported to `attribute_changed_callback`
    fn observed_attributes() -> &'static [&'static str];

    fn connected_callback(&self);

    fn disconnected_callback(&self);

    fn attribute_changed_callback(
        &self,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    );
}

/// Validate custom element name
pub fn is_valid_custom_element_name(name: &str) -> bool {
    // Must contain hyphen
    if !name.contains('-') {
        return false;
    }

    // Must start with lowercase letter
    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return false;
    }

    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return false;
    }

    // Reserved names
    let reserved = [
        "annotation-xml",
        "color-profile",
        "font-face",
        "font-face-src",
        "font-face-uri",
        "font-face-format",
        "font-face-name",
        "missing-glyph",
    ];
    !reserved.contains(&name)
}
