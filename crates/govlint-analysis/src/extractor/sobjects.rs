//! SObject type recognition for parameter classification.

/// How a type name is recognized as an SObject.
#[derive(Debug, Clone, Copy)]
enum SObjectRule {
    /// A standard platform object, compared case-insensitively.
    Standard(&'static str),
    /// A custom schema suffix.
    Suffix(&'static str),
}

const SOBJECT_RULES: &[SObjectRule] = &[
    SObjectRule::Standard("SObject"),
    SObjectRule::Standard("Account"),
    SObjectRule::Standard("Contact"),
    SObjectRule::Standard("Lead"),
    SObjectRule::Standard("Opportunity"),
    SObjectRule::Standard("OpportunityLineItem"),
    SObjectRule::Standard("Case"),
    SObjectRule::Standard("CaseComment"),
    SObjectRule::Standard("Task"),
    SObjectRule::Standard("Event"),
    SObjectRule::Standard("User"),
    SObjectRule::Standard("Campaign"),
    SObjectRule::Standard("CampaignMember"),
    SObjectRule::Standard("Contract"),
    SObjectRule::Standard("Order"),
    SObjectRule::Standard("OrderItem"),
    SObjectRule::Standard("Product2"),
    SObjectRule::Standard("Pricebook2"),
    SObjectRule::Standard("PricebookEntry"),
    SObjectRule::Standard("Quote"),
    SObjectRule::Standard("QuoteLineItem"),
    SObjectRule::Standard("Asset"),
    SObjectRule::Standard("Attachment"),
    SObjectRule::Standard("Note"),
    SObjectRule::Standard("ContentVersion"),
    SObjectRule::Standard("ContentDocument"),
    SObjectRule::Standard("ContentDocumentLink"),
    SObjectRule::Standard("FeedItem"),
    SObjectRule::Standard("Group"),
    SObjectRule::Standard("GroupMember"),
    SObjectRule::Standard("Profile"),
    SObjectRule::Standard("UserRole"),
    SObjectRule::Standard("RecordType"),
    SObjectRule::Standard("Entitlement"),
    SObjectRule::Standard("Solution"),
    SObjectRule::Standard("EmailMessage"),
    SObjectRule::Standard("AccountContactRelation"),
    SObjectRule::Standard("OpportunityContactRole"),
    SObjectRule::Suffix("__c"),
    SObjectRule::Suffix("__mdt"),
    SObjectRule::Suffix("__e"),
    SObjectRule::Suffix("__x"),
    SObjectRule::Suffix("__b"),
];

impl SObjectRule {
    fn matches(&self, type_name: &str) -> bool {
        match self {
            Self::Standard(name) => type_name.eq_ignore_ascii_case(name),
            Self::Suffix(suffix) => {
                type_name.len() > suffix.len()
                    && type_name
                        .get(type_name.len() - suffix.len()..)
                        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
            }
        }
    }
}

/// Whether `type_name` names a standard or custom SObject. A `Schema.`
/// namespace prefix is ignored.
pub fn is_sobject_type(type_name: &str) -> bool {
    let trimmed = type_name.trim();
    let name = match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("schema.") => &trimmed[7..],
        _ => trimmed,
    };
    SOBJECT_RULES.iter().any(|rule| rule.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_and_custom_objects() {
        assert!(is_sobject_type("Account"));
        assert!(is_sobject_type("account"));
        assert!(is_sobject_type("Schema.Opportunity"));
        assert!(is_sobject_type("Invoice__c"));
        assert!(is_sobject_type("Setting__mdt"));
        assert!(is_sobject_type("Order_Event__e"));
    }

    #[test]
    fn primitives_and_bare_suffixes_are_not_sobjects() {
        assert!(!is_sobject_type("String"));
        assert!(!is_sobject_type("Id"));
        assert!(!is_sobject_type("__c"));
        assert!(!is_sobject_type("AccountWrapper"));
    }
}
