//! Cross-file untested-field check and companion resolution.

use govlint_analysis::detectors::IssueKind;
use govlint_analysis::{
    analyze_source, analyze_untested_fields, companion_candidates, extract, NoCompanion,
};
use govlint_core::AnalysisConfig;

const SOURCE: &str = "public class AccountRouter {\n\
    public void route(Account acc) {\n\
        acc.Account_Billing_Country__c = 'DE';\n\
        acc.Sales_Region_Override__c = lookup(acc);\n\
    }\n\
}";

const TEST: &str = "@isTest\n\
private class AccountRouterTest {\n\
    @isTest static void routes() {\n\
        Account acc = new Account(Name = 'x');\n\
        new AccountRouter().route(acc);\n\
    }\n\
}";

#[test]
fn two_untested_fields_two_issues() {
    let source = extract(SOURCE);
    let test = extract(TEST);
    let issues = analyze_untested_fields(&source, &test);
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.kind == IssueKind::UntestedField));

    let first = &issues[0];
    assert!(first.message.contains("Account_Billing_Country__c"));
    assert_eq!(first.range.start.line, 2);
    assert_eq!(
        first.range.end.column - first.range.start.column,
        "Account_Billing_Country__c".len() as u32
    );
    assert_eq!(issues[1].range.start.line, 3);
}

#[test]
fn matching_is_case_insensitive() {
    let source = extract(SOURCE);
    let test = extract(
        "@isTest class AccountRouterTest {\n\
         static void t() {\n\
           Account a = new Account();\n\
           a.account_billing_country__C = 'DE';\n\
           System.assertEquals(null, a.SALES_REGION_OVERRIDE__C);\n\
         }\n\
         }",
    );
    assert!(analyze_untested_fields(&source, &test).is_empty());
}

#[test]
fn fields_named_in_test_queries_count_as_tested() {
    let source = extract(SOURCE);
    let test = extract(
        "@isTest class T {\n\
         static void t() {\n\
           Account a = [SELECT Account_Billing_Country__c, Sales_Region_Override__c FROM Account LIMIT 1];\n\
         }\n\
         }",
    );
    assert!(analyze_untested_fields(&source, &test).is_empty());
}

#[test]
fn standard_and_relationship_fields_are_ignored() {
    let source = extract(
        "public class C {\n\
         void m(Contact c) {\n\
           String n = c.Primary_Account__r.Name;\n\
           c.LastName = 'x';\n\
         }\n\
         }",
    );
    let test = extract("@isTest class CTest { }");
    assert!(analyze_untested_fields(&source, &test).is_empty());
}

#[test]
fn analyze_source_resolves_companion_by_convention() {
    let resolver = |name: &str| {
        assert!(companion_candidates("AccountRouter").iter().any(|c| c == name));
        (name == "TestAccountRouter").then(|| TEST.to_string())
    };
    let result = analyze_source(SOURCE, &AnalysisConfig::default(), &resolver);
    assert_eq!(result.issue_count, 2);
    assert_eq!(result.issues.len(), result.issue_count);
}

#[test]
fn untested_check_is_skipped_for_tests_and_triggers() {
    let always = |_: &str| Some("class Empty { }".to_string());
    let config = AnalysisConfig::default();

    let test_class = "@isTest class AccountRouterTest {\n void t() { a.Some_Field__c = 1; }\n}";
    assert_eq!(analyze_source(test_class, &config, &always).issue_count, 0);

    let trigger = "trigger T on Account (before insert) {\n for (Account a : Trigger.new) {\n  a.Flag__c = true;\n }\n}";
    assert_eq!(analyze_source(trigger, &config, &always).issue_count, 0);
}

#[test]
fn missing_companion_is_not_an_error() {
    let result = analyze_source(SOURCE, &AnalysisConfig::default(), &NoCompanion);
    assert_eq!(result.issue_count, 0);
}
