//! Structural extraction over whole Apex files.

use govlint_analysis::extractor::{
    extract, extract_with, BlockKind, DmlForm, DmlVerb, ExtractOptions, FieldSource, LoopKind,
    QueryKind,
};

const SERVICE: &str = r#"public with sharing class OpportunityService {
    private static final Id OWNER = '005000000000001AAA';

    public static void closeAll(List<Opportunity> opps) {
        for (Opportunity o : opps) {
            Account a = [SELECT Id, Tier__c FROM Account WHERE Id = :o.AccountId];
            o.StageName = 'Closed Won';
            update o;
        }
        notifyOwners(opps);
    }

    @TestVisible
    private static void notifyOwners(List<Opportunity> opps) {
        Database.insert(buildTasks(opps), false);
    }

    private static List<Task> buildTasks(List<Opportunity> opps) {
        // update opps;
        String note = 'insert nothing;';
        return new List<Task>();
    }
}
"#;

#[test]
fn class_level_facts() {
    let parsed = extract(SERVICE);
    assert_eq!(parsed.class_name.as_deref(), Some("OpportunityService"));
    assert!(!parsed.is_test_class);
    assert!(!parsed.is_trigger);
    assert!(parsed.trigger.is_none());

    assert_eq!(parsed.hardcoded_ids.len(), 1);
    assert_eq!(parsed.hardcoded_ids[0].value, "005000000000001AAA");
    assert_eq!(parsed.hardcoded_ids[0].range.start.line, 1);
}

#[test]
fn loops_queries_and_dml() {
    let parsed = extract(SERVICE);
    assert_eq!(parsed.loops.len(), 1);
    assert_eq!(parsed.loops[0].kind, LoopKind::ForEach);
    assert_eq!(parsed.loops[0].range.start.line, 4);
    assert_eq!(parsed.loops[0].range.end.line, 8);

    assert_eq!(parsed.queries.len(), 1);
    assert_eq!(parsed.queries[0].kind, QueryKind::Inline);
    assert!(!parsed.queries[0].has_limit);
    assert_eq!(parsed.queries[0].range.start.line, 5);

    let ops: Vec<(DmlVerb, DmlForm, u32)> = parsed
        .data_operations
        .iter()
        .map(|op| (op.verb, op.form, op.range.start.line))
        .collect();
    assert_eq!(
        ops,
        vec![
            (DmlVerb::Update, DmlForm::Statement, 7),
            (DmlVerb::Insert, DmlForm::DatabaseMethod, 14),
        ]
    );
}

#[test]
fn methods_carry_their_own_facts() {
    let parsed = extract(SERVICE);
    let names: Vec<&str> = parsed.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["closeAll", "notifyOwners", "buildTasks"]);

    let close_all = &parsed.methods[0];
    assert_eq!(close_all.queries.len(), 1);
    assert_eq!(close_all.data_operations.len(), 1);
    assert_eq!(close_all.callee_names, vec!["notifyOwners"]);
    assert_eq!(close_all.parameters[0].base_type, "Opportunity");
    assert!(close_all.parameters[0].is_list());

    let notify = &parsed.methods[1];
    assert!(notify.has_annotation("testvisible"));
    assert_eq!(notify.callee_names, vec!["buildTasks"]);

    let build = &parsed.methods[2];
    assert!(build.data_operations.is_empty());
    assert!(build.callee_names.is_empty());
}

#[test]
fn declarations_are_not_call_sites() {
    let parsed = extract(SERVICE);
    let calls: Vec<&str> = parsed.method_calls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(calls, vec!["notifyOwners", "buildTasks"]);
}

#[test]
fn field_references_from_code_and_queries() {
    let parsed = extract(SERVICE);
    let tier = parsed
        .field_references
        .iter()
        .find(|f| f.name == "Tier__c")
        .expect("Tier__c referenced");
    assert_eq!(tier.position.line, 5);
    assert!(parsed
        .field_references
        .iter()
        .any(|f| f.name == "StageName" || f.source == FieldSource::QueryClause));
}

#[test]
fn test_class_markers() {
    assert!(extract("@isTest\nprivate class ServiceTest { }").is_test_class);
    assert!(extract("@IsTest(SeeAllData=false)\nclass T { }").is_test_class);
    assert!(extract("class T { static testMethod void t() { } }").is_test_class);
    assert!(!extract("class T { String s = '@isTest'; }").is_test_class);
}

#[test]
fn trigger_file() {
    let parsed = extract(
        "trigger LeadTrigger on Lead (after insert, after update) {\n    LeadTriggerHandler.run();\n    update Trigger.new;\n}\n",
    );
    let trigger = parsed.trigger.expect("trigger");
    assert_eq!(trigger.name, "LeadTrigger");
    assert_eq!(trigger.object, "Lead");
    assert_eq!(trigger.events, vec!["after insert", "after update"]);
    assert!(trigger.has_recursion_guard);
    assert_eq!(trigger.data_operations.len(), 1);
    assert_eq!(parsed.class_name, None);
}

#[test]
fn nesting_threshold_comes_from_options() {
    let src = "void m() {\n if (a) {\n  while (b) {\n   try {\n    if (c) {\n    }\n   } catch (Exception e) { }\n  }\n }\n}";
    let default = extract(src);
    assert_eq!(default.deep_nesting.len(), 1);
    assert_eq!(default.deep_nesting[0].depth, 4);
    assert_eq!(default.deep_nesting[0].kind, BlockKind::If);
    assert_eq!(default.deep_nesting[0].position.line, 4);

    let strict = extract_with(src, &ExtractOptions { max_nesting_depth: 2 });
    let lines: Vec<u32> = strict.deep_nesting.iter().map(|n| n.position.line).collect();
    assert_eq!(lines, vec![3, 4]);
}

#[test]
fn malformed_input_is_partial_not_fatal() {
    let parsed = extract("public class Broken {\n  void a() {\n    for (X x : xs) {\n      update x;\n");
    assert_eq!(parsed.class_name.as_deref(), Some("Broken"));
    assert!(parsed.methods.is_empty());
    assert!(parsed.loops.is_empty());
    assert_eq!(parsed.data_operations.len(), 1);
}
