use chrono::Weekday;
use chrono_tz::Tz;

pub const BROKERAGE_NAME: &str = "Bear Team Real Estate";
pub const BROKERAGE_CITY: &str = "Orlando, Florida";
pub const BROKERAGE_ADDRESS: &str = "2300 S Crystal Lake Dr, Orlando, FL 32806";
pub const BROKERAGE_PHONE: &str = "407-375-3321";
pub const BROKERAGE_EMAIL: &str = "info@bearteam.com";

pub const BUSINESS_TZ: Tz = chrono_tz::America::New_York;
pub const TIMEZONE_NAME: &str = "America/New_York";

/// Appointment windows the receptionist may offer.
#[derive(Debug, Clone)]
pub struct BusinessHours {
    pub start_hour: u32,
    pub end_hour: u32,
    pub days: &'static [Weekday],
}

/// Mon-Fri 8 AM to 5 PM Eastern; weekends by appointment only.
pub const BUSINESS_HOURS: BusinessHours = BusinessHours {
    start_hour: 8,
    end_hour: 17,
    days: &[
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ],
};

#[derive(Debug, Clone)]
pub struct Agent {
    pub name: &'static str,
    pub role: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
}

/// The four-person follow-up roster: one listing specialist, one property
/// manager, and two buyer's agents who share incoming buyer leads.
#[derive(Debug, Clone)]
pub struct AgentRoster {
    pub sellers: Agent,
    pub rentals: Agent,
    pub buyers1: Agent,
    pub buyers2: Agent,
}

impl Default for AgentRoster {
    fn default() -> Self {
        Self {
            sellers: Agent {
                name: "Bethanne Baer",
                role: "Broker / Listing Specialist",
                phone: "407-228-1112",
                email: "Bethanne@bearteam.com",
            },
            rentals: Agent {
                name: "Owen Willis",
                role: "Property Manager",
                phone: "407-228-1112",
                email: "owen@bearteam.com",
            },
            buyers1: Agent {
                name: "Lissette Dennis",
                role: "Buyer's Agent",
                phone: "407-577-9924",
                email: "lissette@bearteam.com",
            },
            buyers2: Agent {
                name: "Shanelle Mitchell",
                role: "Buyer's Agent",
                phone: "407-491-8811",
                email: "shanelle@bearteam.com",
            },
        }
    }
}

/// Everything the receptionist is allowed to state as fact on a call:
/// office info, the team, services, and routing rules.
pub fn knowledge_base(roster: &AgentRoster) -> String {
    format!(
        r#"{name} — {city}

WHO WE ARE:
{name} LLC is a full-service real estate brokerage in {city}.
We help buyers find their perfect home, sellers get top dollar, and renters find great properties.

OFFICE INFORMATION:
- Address: {address}
- Phone: {phone}
- Email: {email}
- Website: bearteam.com

OFFICE HOURS:
- Monday to Friday: 8 AM to 5 PM Eastern Time
- Saturday and Sunday: By appointment only
- AI answering service available 24/7

OUR TEAM:
1. {sellers} — {sellers_role} (Sellers)
   - Specializes in listing and selling homes in the Orlando area
   - Expert in pricing strategy, marketing, and negotiations
   - Phone: {sellers_phone} | Email: {sellers_email}

2. {rentals} — {rentals_role} (Rentals)
   - Handles all rental properties and tenant inquiries
   - Manages lease agreements, maintenance, and property showings
   - Phone: {rentals_phone} | Email: {rentals_email}

3. {buyers1} — {buyers1_role}
   - Helps buyers find and purchase homes in Orlando
   - Expert in first-time buyers, relocations, and investment properties
   - Phone: {buyers1_phone} | Email: {buyers1_email}

4. {buyers2} — {buyers2_role}
   - Helps buyers find and purchase homes in Orlando
   - Expert in family homes, new construction, and move-up buyers
   - Phone: {buyers2_phone} | Email: {buyers2_email}

SERVICES:
- Buyer Representation: Help buyers find and purchase homes in Orlando and surrounding areas
- Seller Representation: List, market, and sell homes for maximum value
- Rental & Property Management: Find rental properties, manage leases and tenants
- Investment Properties: Identify and acquire investment properties
- Relocation Services: Help people moving to the Orlando area find the right home

AREAS SERVED:
Orlando and surrounding areas including: Winter Park, Kissimmee, Sanford, Lake Nona,
Dr. Phillips, Windermere, Ocoee, Apopka, Altamonte Springs, and all of Central Florida

BUYING A HOME:
- Free buyer consultation available
- We help with pre-approval guidance, home search, offers, inspections, and closing
- No cost to buyers — our commission is paid by the seller
- We work with all price ranges and first-time buyers welcome

SELLING A HOME:
- Free home valuation / comparative market analysis available
- Professional photography, MLS listing, and marketing included
- Negotiation experts to get you the best price
- Contact {sellers} for listing consultations

RENTALS:
- We manage and list rental properties throughout Orlando
- Contact {rentals} for rental inquiries, availability, and showings
- Both long-term and short-term rentals available

SCHEDULING:
- Home showings available Monday-Sunday with advance notice
- Free consultations available Monday-Friday 8 AM to 5 PM
- Weekend appointments available by request

IF SOMEONE ASKS ABOUT BUYING A HOME:
Route them to {buyers1} ({buyers1_phone}) or {buyers2} ({buyers2_phone}).
Offer to schedule a free buyer consultation.

IF SOMEONE ASKS ABOUT SELLING A HOME:
Route them to {sellers} ({sellers_phone} / {sellers_email}).
Offer a free home valuation.

IF SOMEONE ASKS ABOUT RENTALS:
Route them to {rentals} ({rentals_phone} / {rentals_email}).

IF SOMEONE ASKS ABOUT PRICING OR HOME VALUES:
Explain that pricing depends on the specific property and market conditions.
Offer a free comparative market analysis with {sellers}.
"#,
        name = BROKERAGE_NAME,
        city = BROKERAGE_CITY,
        address = BROKERAGE_ADDRESS,
        phone = BROKERAGE_PHONE,
        email = BROKERAGE_EMAIL,
        sellers = roster.sellers.name,
        sellers_role = roster.sellers.role,
        sellers_phone = roster.sellers.phone,
        sellers_email = roster.sellers.email,
        rentals = roster.rentals.name,
        rentals_role = roster.rentals.role,
        rentals_phone = roster.rentals.phone,
        rentals_email = roster.rentals.email,
        buyers1 = roster.buyers1.name,
        buyers1_role = roster.buyers1.role,
        buyers1_phone = roster.buyers1.phone,
        buyers1_email = roster.buyers1.email,
        buyers2 = roster.buyers2.name,
        buyers2_role = roster.buyers2.role,
        buyers2_phone = roster.buyers2.phone,
        buyers2_email = roster.buyers2.email,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_base_names_the_whole_roster() {
        let roster = AgentRoster::default();
        let kb = knowledge_base(&roster);
        for agent in [&roster.sellers, &roster.rentals, &roster.buyers1, &roster.buyers2] {
            assert!(kb.contains(agent.name), "missing {}", agent.name);
            assert!(kb.contains(agent.phone), "missing phone for {}", agent.name);
        }
        assert!(kb.contains(BROKERAGE_ADDRESS));
    }
}
