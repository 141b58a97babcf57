//! Category feeds: operators publishing one static ICS file per category.

use crate::error::ProviderResult;
use crate::fetch::FetchRequest;

/// One category feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feed {
    /// Category name, for logging.
    pub name: &'static str,
    /// Feed URL.
    pub url: &'static str,
}

const NYISO_FEEDS: [Feed; 6] = [
    Feed {
        name: "Management Committee",
        url: "https://www.nyiso.com/o/oasis-rest/calendar/export/44327.ics",
    },
    Feed {
        name: "Business Issues Committee",
        url: "https://www.nyiso.com/o/oasis-rest/calendar/export/44334.ics",
    },
    Feed {
        name: "Operating Committee",
        url: "https://www.nyiso.com/o/oasis-rest/calendar/export/2167912.ics",
    },
    Feed {
        name: "General Meetings",
        url: "https://www.nyiso.com/o/oasis-rest/calendar/export/3842422.ics",
    },
    Feed {
        name: "Training",
        url: "https://www.nyiso.com/o/oasis-rest/calendar/export/39568.ics",
    },
    Feed {
        name: "Holidays",
        url: "https://www.nyiso.com/o/oasis-rest/calendar/export/2167908.ics",
    },
];

const PJM_FEEDS: [Feed; 8] = [
    Feed {
        name: "Meetings",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-Meetings.ics",
    },
    Feed {
        name: "Training",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-Training.ics",
    },
    Feed {
        name: "Technical Changes",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-Technical-Changes.ics",
    },
    Feed {
        name: "Market Settlements & Billing",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-Market-Settlements-Billing.ics",
    },
    Feed {
        name: "Interconnection Queue",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-Interconnection-Queue.ics",
    },
    Feed {
        name: "FTR Schedule",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-FTR-Schedule.ics",
    },
    Feed {
        name: "RPM Schedule",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-RPM-Schedule.ics",
    },
    Feed {
        name: "Holidays",
        url: "https://www.pjm.com/pjmfiles/calendar/PJM-Holidays.ics",
    },
];

/// Operators publishing per-category ICS files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFeeds {
    /// Six committee/category calendars.
    Nyiso,
    /// Eight category calendars.
    Pjm,
}

impl CategoryFeeds {
    /// The feeds, in merge order. Earlier feeds win identity collisions.
    pub fn feeds(&self) -> &'static [Feed] {
        match self {
            Self::Nyiso => &NYISO_FEEDS,
            Self::Pjm => &PJM_FEEDS,
        }
    }

    /// Whether the first timezone definition found in the feeds is kept.
    pub fn keeps_feed_timezone(&self) -> bool {
        matches!(self, Self::Nyiso)
    }

    /// One request per feed.
    pub fn requests(&self) -> ProviderResult<Vec<(Feed, FetchRequest)>> {
        self.feeds()
            .iter()
            .map(|feed| Ok((*feed, FetchRequest::get(feed.url)?)))
            .collect()
    }
}
