use super::{required, EntityForm};
use crate::error::{StoreError, ValidationError};
use crate::lookups::{cities_of, find_place, states_of, Place, COUNTRIES};
use crate::models::Contact;
use crate::storage::KeyValueStore;

/// Keeps the digits of `input` (at most 13) and lays them out as `#####-#######-#`.
pub fn format_cnic(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(13).collect();
    match digits.len() {
        0..=5 => digits,
        6..=12 => format!("{}-{}", &digits[..5], &digits[5..]),
        _ => format!("{}-{}-{}", &digits[..5], &digits[5..12], &digits[12..]),
    }
}

/// Contact form with cascading country, state and city selects.
///
/// Locations are kept by name so values outside the static tables survive
/// an edit untouched. Choosing a level from the tables clears the levels below it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactForm {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    cnic: String,
    pub dob: String,
    pub email: String,
    pub phone: String,
    pub is_whatsapp: bool,
    country: String,
    state: String,
    city: String,
    pub address: String,
    pub designation: String,
}

fn pick(places: &[Place], id: Option<u32>) -> String {
    id.and_then(|id| places.iter().find(|p| p.id == id))
        .map(|p| p.name.to_string())
        .unwrap_or_default()
}

impl ContactForm {
    pub fn cnic(&self) -> &str {
        &self.cnic
    }

    /// Takes raw CNIC input and stores it formatted.
    pub fn set_cnic(&mut self, input: &str) {
        self.cnic = format_cnic(input);
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// States offered for the chosen country; empty until a listed one is chosen.
    pub fn states(&self) -> &'static [Place] {
        find_place(COUNTRIES, &self.country).map(|c| states_of(c.id)).unwrap_or_default()
    }

    pub fn cities(&self) -> &'static [Place] {
        find_place(self.states(), &self.state).map(|s| cities_of(s.id)).unwrap_or_default()
    }

    /// Picks a country by id and clears the state and city.
    pub fn set_country(&mut self, id: Option<u32>) {
        self.country = pick(COUNTRIES, id);
        self.state.clear();
        self.city.clear();
    }

    /// Picks a state of the current country and clears the city.
    pub fn set_state(&mut self, id: Option<u32>) {
        self.state = pick(self.states(), id);
        self.city.clear();
    }

    pub fn set_city(&mut self, id: Option<u32>) {
        self.city = pick(self.cities(), id);
    }
}

impl Default for ContactForm {
    fn default() -> Self {
        ContactForm {
            title: "Mr.".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            gender: "Male".to_string(),
            cnic: String::new(),
            dob: String::new(),
            email: String::new(),
            phone: String::new(),
            is_whatsapp: false,
            country: String::new(),
            state: String::new(),
            city: String::new(),
            address: String::new(),
            designation: String::new(),
        }
    }
}

impl EntityForm for ContactForm {
    type Record = Contact;
    type Lookups = ();

    fn blank() -> Self {
        ContactForm::default()
    }

    fn from_record(c: &Contact) -> Self {
        ContactForm {
            title: c.title.clone(),
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            gender: c.gender.clone(),
            cnic: format_cnic(&c.cnic),
            dob: c.dob.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            is_whatsapp: c.is_whatsapp,
            country: c.country.clone(),
            state: c.state.clone(),
            city: c.city.clone(),
            address: c.address.clone(),
            designation: c.designation.clone(),
        }
    }

    fn load_lookups(_store: &dyn KeyValueStore) -> Result<(), StoreError> {
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("first name", &self.first_name)
    }

    fn build(&self, existing: Option<&Contact>) -> Contact {
        Contact {
            id: existing.map_or(0, |c| c.id),
            title: self.title.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            gender: self.gender.clone(),
            cnic: self.cnic.clone(),
            dob: self.dob.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            is_whatsapp: self.is_whatsapp,
            country: self.country.clone(),
            state: self.state.clone(),
            city: self.city.clone(),
            address: self.address.trim().to_string(),
            designation: self.designation.trim().to_string(),
        }
    }
}
