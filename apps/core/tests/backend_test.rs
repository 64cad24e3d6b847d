use std::io::Cursor;

use keyspring_core::backend::{ChannelError, RpcChannel, SearchBackend};
use keyspring_core::model::CandidateKind;

fn channel_with_responses(lines: &str) -> RpcChannel<Cursor<Vec<u8>>, Vec<u8>> {
    RpcChannel::new(Cursor::new(lines.as_bytes().to_vec()), Vec::new())
}

fn written_requests(channel: RpcChannel<Cursor<Vec<u8>>, Vec<u8>>) -> Vec<serde_json::Value> {
    let (_, writer) = channel.into_parts();
    String::from_utf8(writer)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn set_list_frames_one_request_line_and_reads_the_reply() {
    let mut channel =
        channel_with_responses("{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"Result\":2}}\n");

    let count = channel
        .set_launchable_list(&["Alpha".to_string(), "Beta".to_string()])
        .unwrap();
    assert_eq!(count, 2);

    let requests = written_requests(channel);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["jsonrpc"], "2.0");
    assert_eq!(requests[0]["id"], 1);
    assert_eq!(requests[0]["method"], "Ranker.SetList");
    assert_eq!(
        requests[0]["params"]["List"],
        serde_json::json!(["Alpha", "Beta"])
    );
}

#[test]
fn command_list_uses_its_own_method_name() {
    let mut channel =
        channel_with_responses("{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"Result\":1}}\n");

    channel.set_command_list(&["build".to_string()]).unwrap();

    let requests = written_requests(channel);
    assert_eq!(requests[0]["method"], "Ranker.SetCommandList");
}

#[test]
fn filter_converts_wire_results_and_tags() {
    let reply = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"Results\":[",
        "{\"Type\":\"command\",\"Text\":\"build\",\"Score\":800,\"Pos\":[0,1]},",
        "{\"Type\":\"list\",\"Text\":\"Browser\",\"Score\":500,\"Pos\":[-1]},",
        "{\"Type\":\"mystery\",\"Text\":\"odd\",\"Score\":1}",
        "]}}\n",
    );
    let mut channel = channel_with_responses(reply);

    let results = channel.filter("b").unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].kind, CandidateKind::Command);
    assert_eq!(results[0].text, "build");
    assert_eq!(results[0].positions, vec![0, 1]);
    assert_eq!(results[1].kind, CandidateKind::List);
    // The -1 sentinel means no highlight.
    assert!(results[1].positions.is_empty());
    // Tags this side never produced dispatch as Unknown.
    assert_eq!(results[2].kind, CandidateKind::Unknown);

    let requests = written_requests(channel);
    assert_eq!(requests[0]["method"], "Ranker.Filter");
    assert_eq!(requests[0]["params"]["Pattern"], "b");
}

#[test]
fn closed_stream_is_reported_as_closed() {
    let mut channel = channel_with_responses("");

    match channel.filter("x") {
        Err(ChannelError::Closed) => {}
        other => panic!("expected closed channel, got {other:?}"),
    }
}

#[test]
fn rpc_error_objects_surface_code_and_message() {
    let mut channel = channel_with_responses(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"error\":{\"code\":-32601,\"message\":\"unknown method\"}}\n",
    );

    match channel.set_command_list(&[]) {
        Err(ChannelError::Rpc { code, message }) => {
            assert_eq!(code, -32601);
            assert_eq!(message, "unknown method");
        }
        other => panic!("expected rpc error, got {other:?}"),
    }
}

#[test]
fn mismatched_response_id_is_a_protocol_violation() {
    let mut channel =
        channel_with_responses("{\"jsonrpc\":\"2.0\",\"id\":99,\"result\":{\"Result\":0}}\n");

    match channel.set_launchable_list(&[]) {
        Err(ChannelError::Protocol(detail)) => assert!(detail.contains("99")),
        other => panic!("expected protocol violation, got {other:?}"),
    }
}

#[test]
fn garbled_response_is_a_decode_error() {
    let mut channel = channel_with_responses("{not-json\n");

    match channel.filter("x") {
        Err(ChannelError::Decode(_)) => {}
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn sequential_calls_use_increasing_ids() {
    let replies = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"Result\":0}}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"result\":{\"Result\":0}}\n",
    );
    let mut channel = channel_with_responses(replies);

    channel.set_launchable_list(&[]).unwrap();
    channel.set_command_list(&[]).unwrap();

    let requests = written_requests(channel);
    assert_eq!(requests[0]["id"], 1);
    assert_eq!(requests[1]["id"], 2);
}
