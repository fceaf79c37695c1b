//! Simulated statute corpus for the reference runtime.
//!
//! Every passage here is fictional. In a deployment these would come from a
//! vector index built over the real statute PDFs; that index is built
//! offline and is not part of the request path.

/// One retrievable passage.
#[derive(Debug, Clone, Copy)]
pub struct Statute {
    pub citation: &'static str,
    pub text: &'static str,
}

impl Statute {
    /// The passage as handed to the workflow: citation, then text.
    pub fn passage(&self) -> String {
        format!("{}: {}", self.citation, self.text)
    }
}

pub const STATUTES: &[Statute] = &[
    Statute {
        citation: "Road Management Ordinance (fictional) art. 12",
        text: "The district office shall repair broken streetlights on public roads \
               within five working days of a report. Streetlights near schools and \
               crossings are repaired first.",
    },
    Statute {
        citation: "Road Management Ordinance (fictional) art. 15",
        text: "Potholes and damaged pavement on public roads shall be marked within \
               24 hours of a report and repaired within ten working days.",
    },
    Statute {
        citation: "Residential Noise Act (fictional) art. 4",
        text: "Noise from apartments measured above 45 decibels at night, between \
               22:00 and 06:00, is a violation. The building management office \
               mediates first; repeated violations are referred to the district \
               environment division.",
    },
    Statute {
        citation: "Residential Noise Act (fictional) art. 9",
        text: "Construction work near residential buildings is prohibited before \
               07:00 and after 19:00. Site operators receive a warning, then a fine.",
    },
    Statute {
        citation: "Waste Management Act (fictional) art. 8",
        text: "Illegal dumping of household waste is subject to a fine. Residents may \
               report dumping sites, and the district cleaning division removes \
               the waste within three working days.",
    },
    Statute {
        citation: "Waste Management Act (fictional) art. 11",
        text: "Household waste collection follows the published district schedule. \
               A missed collection shall be rescheduled within two working days.",
    },
    Statute {
        citation: "Parking Enforcement Ordinance (fictional) art. 3",
        text: "Vehicles parked illegally in fire lanes, crosswalks, or bus stops may \
               be towed. Residents report illegal parking to the traffic division.",
    },
    Statute {
        citation: "Urban Parks Ordinance (fictional) art. 6",
        text: "Broken playground equipment in public parks shall be cordoned off \
               immediately and repaired within fourteen working days.",
    },
    Statute {
        citation: "Water Supply Ordinance (fictional) art. 21",
        text: "Leaks from public water mains are emergency repairs. The water \
               utility dispatches a crew within four hours of a report.",
    },
    Statute {
        citation: "Civil Petitions Act (fictional) art. 14",
        text: "Every civil petition receives a written answer within seven working \
               days. The answering office may extend the period once, with notice \
               to the petitioner.",
    },
];

/// All passages, in corpus order.
pub fn statute_passages() -> Vec<String> {
    STATUTES.iter().map(Statute::passage).collect()
}
