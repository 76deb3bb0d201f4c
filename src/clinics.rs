use crate::models::Clinic;

/// The clinics visitors can report on.
#[derive(Debug, Clone)]
pub struct ClinicDirectory {
    clinics: Vec<Clinic>,
}

impl ClinicDirectory {
    pub fn new(clinics: Vec<Clinic>) -> Self {
        Self { clinics }
    }

    pub fn all(&self) -> &[Clinic] {
        &self.clinics
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Clinic> {
        self.clinics.iter().find(|c| c.id == id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Clinic> {
        self.clinics.iter().find(|c| c.slug == slug)
    }

    /// Accepts either a clinic id or its slug.
    pub fn resolve(&self, key: &str) -> Option<&Clinic> {
        self.find_by_id(key).or_else(|| self.find_by_slug(key))
    }
}

impl Default for ClinicDirectory {
    fn default() -> Self {
        const AREA: &str = "Whitefield, Bangalore";
        Self::new(vec![
            Clinic::new("1", "Apollo Clinic Whitefield", AREA, "apollo-clinic-whitefield"),
            Clinic::new("2", "Whitefield Dental Care", AREA, "whitefield-dental-care"),
            Clinic::new("3", "Sparsh Clinic Whitefield", AREA, "sparsh-clinic-whitefield"),
            Clinic::new(
                "4",
                "Narayana Health City Whitefield",
                AREA,
                "narayana-health-city-whitefield",
            ),
            Clinic::new(
                "5",
                "Cloudnine Hospital Whitefield",
                AREA,
                "cloudnine-hospital-whitefield",
            ),
            Clinic::new("6", "Whitefield Eye Care", AREA, "whitefield-eye-care"),
            Clinic::new(
                "7",
                "Dr. Agarwal's Eye Hospital Whitefield",
                AREA,
                "dr-agarwals-eye-hospital-whitefield",
            ),
        ])
    }
}
