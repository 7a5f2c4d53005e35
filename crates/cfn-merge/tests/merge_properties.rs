//! Behavioural tests for the merge engine on realistic template fragments.

use cfn_merge::{Classification, DocumentNode, FragmentMerger};
use cfn_yaml::{parse, to_yaml_string, Mapping, Scalar};
use proptest::prelude::*;

fn merge_yaml(target: &str, source: &str) -> DocumentNode {
    FragmentMerger::default().merge(parse(target).unwrap(), parse(source).unwrap())
}

fn assert_merges_to(target: &str, source: &str, expected: &str) {
    assert_eq!(merge_yaml(target, source), parse(expected).unwrap());
}

#[test]
fn empty_source_changes_nothing() {
    let template = "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n    Properties:\n      Tags: [a, a]\n";
    assert_merges_to(template, "{}", template);
}

#[test]
fn scalar_conflicts_go_to_source() {
    assert_merges_to(
        "Properties:\n  Timeout: 30\n  MemorySize: 128",
        "Properties:\n  Timeout: 60",
        "Properties:\n  Timeout: 60\n  MemorySize: 128",
    );
}

#[test]
fn action_lists_grow_without_duplicates() {
    assert_merges_to("Action: [a1, a2]", "Action: [a2, a3]", "Action: [a1, a2, a3]");
}

#[test]
fn statements_with_same_sid_merge() {
    let merged = merge_yaml(
        "Statement:\n  - Sid: S1\n    Action: [x]",
        "Statement:\n  - Sid: S1\n    Action: [y]",
    );
    insta::assert_snapshot!(to_yaml_string(&merged), @r"
    Statement:
      - Sid: S1
        Action:
          - x
          - y
    ");
}

#[test]
fn condition_functions_are_replaced() {
    assert_merges_to("Foo: !If [A, 1, 2]", "Foo: !If [B, 3, 4]", "Foo: !If [B, 3, 4]");
}

#[test]
fn nested_condition_functions_are_replaced() {
    assert_merges_to(
        "Foo: !If [A, !If [B, 1, 2], 3]",
        "Foo: !If [C, !If [D, 4, 5], 6]",
        "Foo: !If [C, !If [D, 4, 5], 6]",
    );
    assert_merges_to(
        "Conditions:\n  IsProd: !Equals [!Ref Stage, prod]\n  NotProd: !Not [!Equals [!Ref Stage, prod]]",
        "Conditions:\n  IsProd: !Equals [!Ref Stage, production]\n  NotProd: !Not [!Equals [!Ref Stage, production]]",
        "Conditions:\n  IsProd: !Equals [!Ref Stage, production]\n  NotProd: !Not [!Equals [!Ref Stage, production]]",
    );
    assert_merges_to(
        "Either: !Or [!Condition A, !Condition B]\nBoth: !And [!Condition A, !Condition B]",
        "Either: !Or [!Condition C, !Condition D]\nBoth: !And [!Condition C, !Condition D]",
        "Either: !Or [!Condition C, !Condition D]\nBoth: !And [!Condition C, !Condition D]",
    );
}

#[test]
fn condition_single_value_and_list_reconcile() {
    assert_merges_to("Condition: C1", "Condition: [C1, C2]", "Condition: [C1, C2]");
    assert_merges_to("Condition: [C1, C2]", "Condition: C3", "Condition: [C1, C2, C3]");
    assert_merges_to("Condition: C1", "Condition: C1", "Condition: C1");
    assert_merges_to("Condition: C1", "Condition: C2", "Condition: [C1, C2]");
}

#[test]
fn matching_statements_are_found_anywhere_in_the_list() {
    let target = "Statement:
  - Sid: S1
    Action: [x]
  - Sid: S2
    Action: [s2]
";
    let source = "Statement:
  - Sid: S3
    Action: [s3]
  - Sid: S1
    Action: [y]
";
    assert_merges_to(
        target,
        source,
        "Statement:
  - Sid: S2
    Action: [s2]
  - Sid: S3
    Action: [s3]
  - Sid: S1
    Action: [x, y]
",
    );

    let target = "Statement:
  - Sid: S2
    Action: [s2]
  - Sid: S1
    Action: [x]
";
    let source = "Statement:
  - Sid: S1
    Action: [y]
  - Sid: S3
    Action: [s3]
";
    assert_merges_to(
        target,
        source,
        "Statement:
  - Sid: S2
    Action: [s2]
  - Sid: S1
    Action: [x, y]
  - Sid: S3
    Action: [s3]
",
    );
}

#[test]
fn duplicate_resources_collapse() {
    assert_merges_to(
        "Resource: [arn:aws:s3:::a, arn:aws:s3:::b]",
        "Resource: [arn:aws:s3:::b, arn:aws:s3:::a]",
        "Resource: [arn:aws:s3:::a, arn:aws:s3:::b]",
    );
    assert_merges_to(
        "Resource: !GetAtt Bucket.Arn",
        "Resource: [!GetAtt Bucket.Arn, !Sub '${Bucket.Arn}/*']",
        "Resource: [!GetAtt Bucket.Arn, !Sub '${Bucket.Arn}/*']",
    );
}

#[test]
fn environment_blocks_merge_as_mappings() {
    assert_merges_to(
        "functions:\n  api:\n    environment:\n      TABLE: users\n      STAGE: dev",
        "functions:\n  api:\n    environment:\n      STAGE: prod\n      QUEUE: !Ref Queue",
        "functions:\n  api:\n    environment:\n      TABLE: users\n      STAGE: prod\n      QUEUE: !Ref Queue",
    );
}

#[test]
fn policies_merge_by_policy_name() {
    let target = "Policies:
  - PolicyName: access
    PolicyDocument:
      Version: '2012-10-17'
      Statement:
        - Sid: Read
          Effect: Allow
          Action: s3:GetObject
          Resource: !GetAtt Bucket.Arn
";
    let source = "Policies:
  - PolicyName: logs
    PolicyDocument:
      Statement:
        - Effect: Allow
          Action: logs:*
          Resource: '*'
  - PolicyName: access
    PolicyDocument:
      Statement:
        - Sid: Read
          Effect: Allow
          Action: s3:ListBucket
          Resource: !GetAtt Bucket.Arn
";
    assert_merges_to(
        target,
        source,
        "Policies:
  - PolicyName: logs
    PolicyDocument:
      Statement:
        - Effect: Allow
          Action: logs:*
          Resource: '*'
  - PolicyName: access
    PolicyDocument:
      Version: '2012-10-17'
      Statement:
        - Sid: Read
          Effect: Allow
          Action: [s3:GetObject, s3:ListBucket]
          Resource: !GetAtt Bucket.Arn
",
    );
}

#[test]
fn serverless_role_statements_merge_by_sid() {
    assert_merges_to(
        "provider:\n  iamRoleStatements:\n    - Sid: Dynamo\n      Effect: Allow\n      Action: [dynamodb:GetItem]\n",
        "provider:\n  iamRoleStatements:\n    - Sid: Dynamo\n      Effect: Allow\n      Action: [dynamodb:PutItem]\n",
        "provider:\n  iamRoleStatements:\n    - Sid: Dynamo\n      Effect: Allow\n      Action: [dynamodb:GetItem, dynamodb:PutItem]\n",
    );
}

#[test]
fn depends_on_accepts_single_and_list() {
    assert_merges_to(
        "Resources:\n  Fn:\n    DependsOn: Role",
        "Resources:\n  Fn:\n    DependsOn: [Queue, Role]",
        "Resources:\n  Fn:\n    DependsOn: [Role, Queue]",
    );
}

#[test]
fn inputs_are_not_shared_with_the_result() {
    let target = parse("Action: [a]").unwrap();
    let source = parse("Action: [b]").unwrap();
    let merger = FragmentMerger::default();

    let merged = merger.merge(target.clone(), source.clone());
    assert_eq!(merged, parse("Action: [a, b]").unwrap());
    assert_eq!(target, parse("Action: [a]").unwrap());
    assert_eq!(source, parse("Action: [b]").unwrap());
}

#[test]
fn merger_can_be_shared_across_threads() {
    let merger = FragmentMerger::new(Classification::cloudformation().with_array_eligible("Ports"));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let merger = merger.clone();
            std::thread::spawn(move || {
                let target = parse("Ports: [80]").unwrap();
                let source = parse(&format!("Ports: {}", 8000 + i)).unwrap();
                merger.merge(target, source)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let merged = handle.join().unwrap();
        let expected = parse(&format!("Ports: [80, {}]", 8000 + i)).unwrap();
        assert_eq!(merged, expected);
    }
}

const TAGS: &[&str] = &["Ref", "Fn::GetAtt", "Fn::Sub", "Fn::If", "Fn::Join"];

fn arb_scalar() -> impl Strategy<Value = DocumentNode> {
    prop_oneof![
        Just(DocumentNode::Scalar(Scalar::Null)),
        any::<bool>().prop_map(|b| DocumentNode::Scalar(Scalar::Bool(b))),
        any::<i64>().prop_map(|i| DocumentNode::Scalar(Scalar::Integer(i))),
        "[a-zA-Z0-9:*/-]{0,12}".prop_map(|s| DocumentNode::Scalar(Scalar::String(s))),
    ]
}

fn arb_node() -> impl Strategy<Value = DocumentNode> {
    arb_scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(DocumentNode::Sequence),
            arb_mapping_with(inner.clone()),
            (prop::sample::select(TAGS), inner)
                .prop_map(|(tag, body)| DocumentNode::tagged(tag, body)),
        ]
    })
}

fn arb_mapping_with(
    values: impl Strategy<Value = DocumentNode>,
) -> impl Strategy<Value = DocumentNode> {
    let keys = prop_oneof![
        "[A-Za-z]{1,8}",
        prop::sample::select(&["Action", "Statement", "Sid", "Condition", "Fn::If"][..])
            .prop_map(String::from),
    ];
    prop::collection::vec((keys, values), 0..6)
        .prop_map(|entries| DocumentNode::Mapping(entries.into_iter().collect::<Mapping>()))
}

proptest! {
    #[test]
    fn merging_empty_source_is_identity(template in arb_mapping_with(arb_node())) {
        let merged = FragmentMerger::default().merge(template.clone(), DocumentNode::mapping());
        prop_assert_eq!(merged, template);
    }

    #[test]
    fn merging_into_empty_target_yields_source(fragment in arb_mapping_with(arb_node())) {
        let merged = FragmentMerger::default().merge(DocumentNode::mapping(), fragment.clone());
        prop_assert_eq!(merged, fragment);
    }

    #[test]
    fn scalar_conflicts_always_go_to_source(
        key in "Custom[A-Z][a-z]{1,6}",
        target in arb_scalar(),
        source in arb_scalar(),
    ) {
        let mut target_map = Mapping::new();
        target_map.insert(key.clone(), target);
        let mut source_map = Mapping::new();
        source_map.insert(key.clone(), source.clone());

        let merged = FragmentMerger::default()
            .merge(DocumentNode::Mapping(target_map), DocumentNode::Mapping(source_map));
        prop_assert_eq!(merged.get(&key), Some(&source));
    }
}
