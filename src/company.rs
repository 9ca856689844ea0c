use crate::error::RosterError;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static COMPANY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Working-at-(.*?)-EI_I(E\d+)").expect("company URL pattern should be valid")
});

static COMPANY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^E\d+$").expect("company code pattern should be valid"));

/// A company to harvest, as listed on the roster
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Company {
    /// Display name as it appears in site URLs
    pub name: String,
    /// External employer code, e.g. `E1138`
    pub code: String,
}

impl Company {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// Build a company from one roster row
    ///
    /// The second column is either an employer overview URL
    /// (`.../Working-at-Acme-EI_IE123.htm`) or a bare code paired with the
    /// display name in the first column.
    pub fn from_roster_row(row: &csv::StringRecord) -> Option<Self> {
        let second = row.get(1)?.trim();

        if let Some(caps) = COMPANY_URL.captures(second) {
            return Some(Self::new(&caps[1], &caps[2]));
        }

        let name = row.get(0)?.trim();
        if !name.is_empty() && COMPANY_CODE.is_match(second) {
            return Some(Self::new(name.replace(' ', "-"), second));
        }

        None
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Load the company roster, skipping its header row
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<Company>, RosterError> {
    let path = path.as_ref();
    let read_err = |source| RosterError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let mut companies = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(read_err)?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match Company::from_roster_row(&row) {
            Some(company) => {
                ::log::debug!("Roster row {}: {}", line + 2, company);
                companies.push(company);
            }
            None => ::log::warn!("Roster row {} has no company code, skipping: {:?}", line + 2, row),
        }
    }

    if companies.is_empty() {
        return Err(RosterError::Empty(path.to_path_buf()));
    }

    ::log::info!("Loaded {} companies from {}", companies.len(), path.display());
    Ok(companies)
}
