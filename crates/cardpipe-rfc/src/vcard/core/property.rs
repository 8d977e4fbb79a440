use super::parameter::VCardParameter;
use super::value::VCardValue;

/// One content line of a card.
///
/// `raw_value` is the undecoded wire text. Values the decoder could not
/// interpret are re-serialized from it unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct VCardProperty {
    /// `item1` in `item1.TEL`.
    pub group: Option<String>,
    /// Uppercased on construction.
    pub name: String,
    pub params: Vec<VCardParameter>,
    pub value: VCardValue,
    pub raw_value: String,
}

impl VCardProperty {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<VCardValue>) -> Self {
        let mut name = name.into();
        name.make_ascii_uppercase();
        Self {
            group: None,
            name,
            params: Vec::new(),
            value: value.into(),
            raw_value: String::new(),
        }
    }

    fn with_raw(name: impl Into<String>, raw: String, wrap: fn(String) -> VCardValue) -> Self {
        Self {
            raw_value: raw.clone(),
            ..Self::new(name, wrap(raw))
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_raw(name, value.into(), VCardValue::Text)
    }

    #[must_use]
    pub fn uri(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_raw(name, value.into(), VCardValue::Uri)
    }

    #[must_use]
    pub fn with_param(mut self, param: VCardParameter) -> Self {
        self.add_param(param);
        self
    }

    pub fn add_param(&mut self, param: VCardParameter) {
        self.params.push(param);
    }

    /// Appends to the first TYPE parameter, creating it if needed.
    pub fn add_type(&mut self, type_value: impl Into<String>) {
        match self.params.iter_mut().find(|p| p.is(VCardParameter::TYPE)) {
            Some(param) => param.values.push(type_value.into()),
            None => self.add_param(VCardParameter::type_value(type_value)),
        }
    }

    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&VCardParameter> {
        self.params.iter().find(|p| p.is(name))
    }

    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name).and_then(VCardParameter::value)
    }

    /// Lowercased TYPE values from every TYPE parameter, in order.
    #[must_use]
    pub fn types(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| p.is(VCardParameter::TYPE))
            .flat_map(VCardParameter::split_values)
            .map(str::to_ascii_lowercase)
            .collect()
    }

    /// The PREF parameter, or 1 for a vCard 3.0 `TYPE=pref`.
    #[must_use]
    pub fn pref(&self) -> Option<u8> {
        if let Some(pref) = self.get_param_value(VCardParameter::PREF) {
            return pref.trim().parse().ok();
        }
        self.params
            .iter()
            .filter(|p| p.is(VCardParameter::TYPE))
            .flat_map(VCardParameter::split_values)
            .any(|t| t.eq_ignore_ascii_case("pref"))
            .then_some(1)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }
}

/// Property names referenced across the workspace.
pub mod names {
    pub const FN: &str = "FN";
    pub const N: &str = "N";
    pub const NICKNAME: &str = "NICKNAME";
    pub const PHOTO: &str = "PHOTO";
    pub const BDAY: &str = "BDAY";
    pub const ANNIVERSARY: &str = "ANNIVERSARY";
    pub const GENDER: &str = "GENDER";
    pub const ADR: &str = "ADR";
    pub const TEL: &str = "TEL";
    pub const EMAIL: &str = "EMAIL";
    pub const IMPP: &str = "IMPP";
    pub const TITLE: &str = "TITLE";
    pub const ROLE: &str = "ROLE";
    pub const ORG: &str = "ORG";
    pub const MEMBER: &str = "MEMBER";
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const NOTE: &str = "NOTE";
    pub const PRODID: &str = "PRODID";
    pub const REV: &str = "REV";
    pub const UID: &str = "UID";
    pub const URL: &str = "URL";
    pub const KIND: &str = "KIND";
    pub const CLASS: &str = "CLASS";
    pub const VERSION: &str = "VERSION";

    // Apple address book extensions used by vCard 3.0 clients.
    pub const X_ANNIVERSARY: &str = "X-ANNIVERSARY";
    pub const X_ABS_KIND: &str = "X-ADDRESSBOOKSERVER-KIND";
    pub const X_ABS_MEMBER: &str = "X-ADDRESSBOOKSERVER-MEMBER";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_keep_raw_text() {
        let prop = VCardProperty::uri("url", "https://example.com");
        assert_eq!(prop.name, "URL");
        assert_eq!(prop.raw_value, "https://example.com");
        assert_eq!(prop.as_text(), None);
    }

    #[test]
    fn repeated_and_joined_types_merge() {
        let mut prop = VCardProperty::text("TEL", "+1-555-555-5555")
            .with_param(VCardParameter::multi("type", vec!["HOME,Voice".into()]));
        prop.add_type("cell");
        prop.add_param(VCardParameter::type_value("fax"));

        assert_eq!(prop.types(), ["home", "voice", "cell", "fax"]);
        assert_eq!(prop.params.len(), 2);
    }

    #[test]
    fn pref_parameter_wins_over_pref_type() {
        let mut v3 = VCardProperty::text("EMAIL", "a@example.com");
        v3.add_type("INTERNET");
        v3.add_type("PREF");
        assert_eq!(v3.pref(), Some(1));

        let explicit = v3.clone().with_param(VCardParameter::pref(7));
        assert_eq!(explicit.pref(), Some(7));

        let garbage = VCardProperty::text("EMAIL", "c@example.com")
            .with_param(VCardParameter::new("PREF", "high"));
        assert_eq!(garbage.pref(), None);
    }
}
