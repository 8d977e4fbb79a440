/// A property parameter such as `TYPE=home,work`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardParameter {
    /// Uppercased on construction.
    pub name: String,
    pub values: Vec<String>,
}

impl VCardParameter {
    pub const TYPE: &'static str = "TYPE";
    pub const PREF: &'static str = "PREF";
    pub const VALUE: &'static str = "VALUE";
    pub const ENCODING: &'static str = "ENCODING";
    pub const MEDIATYPE: &'static str = "MEDIATYPE";

    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::multi(name, vec![value.into()])
    }

    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        let mut name = name.into();
        name.make_ascii_uppercase();
        Self { name, values }
    }

    #[must_use]
    pub fn type_value(value: impl Into<String>) -> Self {
        Self::new(Self::TYPE, value)
    }

    /// `PREF=<priority>`; 1 is the most preferred.
    #[must_use]
    pub fn pref(priority: u8) -> Self {
        Self::new(Self::PREF, priority.to_string())
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Values with any comma-joined lists expanded. vCard 3.0 writers emit
    /// both `TYPE=a,b` and `TYPE="a,b"`.
    pub fn split_values(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
