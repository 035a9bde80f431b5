mod common;

use common::{bulk, connection, pipelined_connection, sentinel_connection, MockClient};
use redbridge::proto::frame::Frame;
use redbridge::{ErrorKind, RedisConnection, RedisNode, ShutdownOption};

const NOSAVE_SCRIPT: &str = "return redis.call('SHUTDOWN','NOSAVE')";
const SAVE_SCRIPT: &str = "return redis.call('SHUTDOWN','SAVE')";
const OVER_I32: i64 = i32::MAX as i64 + 1;

fn assert_illegal_argument<T: std::fmt::Debug>(result: redbridge::Result<T>) {
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalArgument, "{err}");
}

fn assert_unsupported<T: std::fmt::Debug>(result: redbridge::Result<T>, client: &MockClient) {
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation, "{err}");
    assert_eq!(client.calls(), 0);
}

/// Range checks reject before any native call, in both modes.
fn check_range_validation(conn: &mut RedisConnection<MockClient>, client: &MockClient) {
    assert_illegal_argument(conn.restore("foo", OVER_I32, "bar"));
    assert_illegal_argument(conn.set_ex("foo", OVER_I32, "bar"));
    assert_illegal_argument(conn.get_range("foo", OVER_I32, i32::MAX as i64));
    assert_illegal_argument(conn.get_range("foo", i32::MAX as i64, OVER_I32));
    assert_illegal_argument(conn.s_rand_member_count("foo", OVER_I32));
    assert_illegal_argument(conn.s_rand_member_count("foo", i32::MIN as i64 - 1));
    assert_illegal_argument(conn.z_range_by_score("foo", 0.0, 1.0, Some((OVER_I32, 10))));
    assert_illegal_argument(conn.z_range_by_score("foo", 0.0, 1.0, Some((0, OVER_I32))));
    assert_eq!(client.calls(), 0);
}

mod direct {
    use super::*;

    #[test]
    fn test_shutdown_without_option_sends_shutdown() {
        let (mut conn, client) = connection();
        conn.shutdown(None).unwrap().value().unwrap();

        assert_eq!(client.executed(), vec![vec!["SHUTDOWN"]]);
    }

    #[test]
    fn test_shutdown_nosave_uses_lua_script() {
        let (mut conn, client) = connection();
        conn.shutdown(Some(ShutdownOption::NoSave)).unwrap().value().unwrap();

        assert_eq!(client.executed(), vec![vec!["EVAL", NOSAVE_SCRIPT, "0"]]);
    }

    #[test]
    fn test_shutdown_save_uses_lua_script() {
        let (mut conn, client) = connection();
        conn.shutdown(Some(ShutdownOption::Save)).unwrap().value().unwrap();

        assert_eq!(client.executed(), vec![vec!["EVAL", SAVE_SCRIPT, "0"]]);
    }

    #[test]
    fn test_shutdown_treats_dropped_connection_as_success() {
        let (mut conn, client) = connection();
        client.reply_eof("EVAL");
        conn.shutdown(Some(ShutdownOption::NoSave)).unwrap().value().unwrap();
    }

    #[test]
    fn test_kill_client_delegates() {
        let (mut conn, client) = connection();
        conn.kill_client("127.0.0.1", 1001).unwrap();

        assert_eq!(client.executed(), vec![vec!["CLIENT", "KILL", "127.0.0.1:1001"]]);
    }

    #[test]
    fn test_kill_client_rejects_empty_host() {
        let (mut conn, client) = connection();
        assert_illegal_argument(conn.kill_client("", 1001));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_get_client_name_delegates() {
        let (mut conn, client) = connection();
        client.reply("CLIENT", redbridge::proto::frame::Frame::bulk("worker-1"));

        assert_eq!(conn.get_client_name().unwrap().as_deref(), Some("worker-1"));
        assert_eq!(client.executed(), vec![vec!["CLIENT", "GETNAME"]]);
    }

    #[test]
    fn test_slave_of_rejects_empty_host() {
        let (mut conn, client) = connection();
        assert_illegal_argument(conn.slave_of("", 0));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_slave_of_delegates() {
        let (mut conn, client) = connection();
        conn.slave_of("127.0.0.1", 1001).unwrap();

        assert_eq!(client.executed(), vec![vec!["SLAVEOF", "127.0.0.1", "1001"]]);
    }

    #[test]
    fn test_slave_of_accepts_port_zero() {
        let (mut conn, client) = connection();
        conn.slave_of("127.0.0.1", 0).unwrap();

        assert_eq!(client.executed(), vec![vec!["SLAVEOF", "127.0.0.1", "0"]]);
    }

    #[test]
    fn test_slave_of_no_one_delegates() {
        let (mut conn, client) = connection();
        conn.slave_of_no_one().unwrap();

        assert_eq!(client.executed(), vec![vec!["SLAVEOF", "NO", "ONE"]]);
    }

    #[test]
    fn test_range_checks() {
        let (mut conn, client) = connection();
        check_range_validation(&mut conn, &client);
    }

    #[test]
    fn test_range_boundaries_are_accepted() {
        let (mut conn, client) = connection();
        let max = i32::MAX as i64;
        let min = i32::MIN as i64;

        conn.restore("foo", max, "bar").unwrap().value().unwrap();
        conn.set_ex("foo", max, "bar").unwrap().value().unwrap();
        conn.get_range("foo", min, max).unwrap().value().unwrap();
        client.reply("SRANDMEMBER", redbridge::proto::frame::Frame::Array(vec![]));
        conn.s_rand_member_count("foo", max).unwrap().value().unwrap();
        client.reply("ZRANGEBYSCORE", redbridge::proto::frame::Frame::Array(vec![]));
        conn.z_range_by_score("foo", 0.0, 1.0, Some((max, max))).unwrap().value().unwrap();

        assert_eq!(
            client.executed()[0],
            vec!["RESTORE", "foo", "2147483647", "bar"]
        );
        assert_eq!(client.executed()[2], vec!["GETRANGE", "foo", "-2147483648", "2147483647"]);
        assert_eq!(
            client.executed()[4],
            vec![
                "ZRANGEBYSCORE",
                "foo",
                "0",
                "1",
                "LIMIT",
                "2147483647",
                "2147483647"
            ]
        );
    }

    #[test]
    fn test_sentinel_connection_requires_configuration() {
        let (conn, client) = connection();
        let err = conn.get_sentinel_connection().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceUsage);
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_select_and_set_client_name() {
        let (mut conn, client) = connection();
        conn.select(3).unwrap();
        conn.set_client_name("worker").unwrap();

        assert_eq!(
            client.executed(),
            vec![vec!["SELECT", "3"], vec!["CLIENT", "SETNAME", "worker"]]
        );
    }

    #[test]
    fn test_operations_after_close_fail() {
        let (mut conn, client) = connection();
        conn.close().unwrap();
        conn.close().unwrap();

        let err = conn.get("foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidApiUsage);
        assert_eq!(client.quits(), 1);
        assert!(client.executed().is_empty());
    }

    #[test]
    fn test_generic_execute() {
        let (mut conn, client) = connection();
        client.reply("OBJECT", redbridge::proto::frame::Frame::Integer(2));

        let value = conn.execute("OBJECT", ["REFCOUNT", "foo"]).unwrap().value().unwrap();
        assert_eq!(value, redbridge::Value::Int(2));
        assert_eq!(client.executed(), vec![vec!["OBJECT", "REFCOUNT", "foo"]]);
    }
}

mod delegation {
    use super::*;

    fn strings(frames: &[&str]) -> Frame {
        Frame::Array(frames.iter().map(|f| Frame::bulk(f.to_string())).collect())
    }

    #[test]
    fn test_key_commands() {
        let (mut conn, client) = connection();
        client
            .reply("DEL", Frame::Integer(2))
            .reply("TTL", Frame::Integer(-1))
            .reply("PERSIST", Frame::Integer(1));

        assert_eq!(conn.del(&["a", "b"]).unwrap().value().unwrap(), 2);
        assert_eq!(conn.ttl("a").unwrap().value().unwrap(), -1);
        conn.rename("a", "b").unwrap().value().unwrap();
        assert!(conn.persist("b").unwrap().value().unwrap());

        assert_eq!(
            client.executed(),
            vec![
                vec!["DEL", "a", "b"],
                vec!["TTL", "a"],
                vec!["RENAME", "a", "b"],
                vec!["PERSIST", "b"],
            ]
        );
    }

    #[test]
    fn test_set_commands() {
        let (mut conn, client) = connection();
        client
            .reply("SADD", Frame::Integer(2))
            .reply("SREM", Frame::Integer(1))
            .reply("SMEMBERS", strings(&["x", "y"]))
            .reply("SISMEMBER", Frame::Integer(0))
            .reply("SCARD", Frame::Integer(2))
            .reply("SRANDMEMBER", Frame::bulk("y"));

        assert_eq!(conn.s_add("s", &["x", "y"]).unwrap().value().unwrap(), 2);
        assert_eq!(conn.s_rem("s", &["z"]).unwrap().value().unwrap(), 1);
        assert_eq!(
            conn.s_members("s").unwrap().value().unwrap(),
            vec![bulk("x"), bulk("y")]
        );
        assert!(!conn.s_is_member("s", "z").unwrap().value().unwrap());
        assert_eq!(conn.s_card("s").unwrap().value().unwrap(), 2);
        assert_eq!(conn.s_rand_member("s").unwrap().value().unwrap(), Some(bulk("y")));

        assert_eq!(
            client.executed(),
            vec![
                vec!["SADD", "s", "x", "y"],
                vec!["SREM", "s", "z"],
                vec!["SMEMBERS", "s"],
                vec!["SISMEMBER", "s", "z"],
                vec!["SCARD", "s"],
                vec!["SRANDMEMBER", "s"],
            ]
        );
    }

    #[test]
    fn test_hash_commands() {
        let (mut conn, client) = connection();
        client
            .reply("HDEL", Frame::Integer(1))
            .reply("HKEYS", strings(&["f1", "f2"]))
            .reply("HVALS", strings(&["v1", "v2"]));

        assert_eq!(conn.h_del("h", &["f1", "nope"]).unwrap().value().unwrap(), 1);
        assert_eq!(
            conn.h_keys("h").unwrap().value().unwrap(),
            vec![bulk("f1"), bulk("f2")]
        );
        assert_eq!(
            conn.h_vals("h").unwrap().value().unwrap(),
            vec![bulk("v1"), bulk("v2")]
        );

        assert_eq!(
            client.executed(),
            vec![
                vec!["HDEL", "h", "f1", "nope"],
                vec!["HKEYS", "h"],
                vec!["HVALS", "h"],
            ]
        );
    }

    #[test]
    fn test_sorted_set_commands() {
        let (mut conn, client) = connection();
        client
            .reply("ZADD", Frame::Integer(1))
            .reply("ZREM", Frame::Integer(2))
            .reply("ZCARD", Frame::Integer(3))
            .reply("ZINCRBY", Frame::bulk("4"));

        assert!(conn.z_add("z", 1.5, "m").unwrap().value().unwrap());
        assert_eq!(conn.z_rem("z", &["m", "n"]).unwrap().value().unwrap(), 2);
        assert_eq!(conn.z_card("z").unwrap().value().unwrap(), 3);
        assert_eq!(conn.z_incr_by("z", 2.5, "m").unwrap().value().unwrap(), 4.0);

        assert_eq!(
            client.executed(),
            vec![
                vec!["ZADD", "z", "1.5", "m"],
                vec!["ZREM", "z", "m", "n"],
                vec!["ZCARD", "z"],
                vec!["ZINCRBY", "z", "2.5", "m"],
            ]
        );
    }

    #[test]
    fn test_multi_argument_commands_queue_every_argument() {
        let (mut conn, client) = pipelined_connection();
        assert!(conn.del(&["a", "b"]).unwrap().is_queued());
        assert!(conn.s_add("s", &["x"]).unwrap().is_queued());
        assert!(conn.h_del("h", &["f"]).unwrap().is_queued());
        assert!(conn.z_rem("z", &["m"]).unwrap().is_queued());

        assert_eq!(
            client.pipelined(),
            vec![
                vec!["DEL", "a", "b"],
                vec!["SADD", "s", "x"],
                vec!["HDEL", "h", "f"],
                vec!["ZREM", "z", "m"],
            ]
        );
        assert!(client.executed().is_empty());
    }

    #[test]
    fn test_empty_argument_lists_are_rejected() {
        let none: &[&str] = &[];
        for (mut conn, client) in [connection(), pipelined_connection()] {
            assert_illegal_argument(conn.del(none));
            assert_illegal_argument(conn.s_add("s", none));
            assert_illegal_argument(conn.s_rem("s", none));
            assert_illegal_argument(conn.h_del("h", none));
            assert_illegal_argument(conn.z_rem("z", none));
            assert_eq!(client.calls(), 0);
        }
    }
}

mod pipelined {
    use super::*;

    #[test]
    fn test_shutdown_without_option_is_queued() {
        let (mut conn, client) = pipelined_connection();
        let reply = conn.shutdown(None).unwrap();

        assert!(reply.is_queued());
        assert_eq!(client.pipelined(), vec![vec!["SHUTDOWN"]]);
        assert!(client.executed().is_empty());
    }

    #[test]
    fn test_shutdown_nosave_is_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.shutdown(Some(ShutdownOption::NoSave)), &client);
    }

    #[test]
    fn test_shutdown_save_is_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.shutdown(Some(ShutdownOption::Save)), &client);
    }

    #[test]
    fn test_kill_client_is_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.kill_client("127.0.0.1", 1001), &client);
    }

    #[test]
    fn test_get_client_name_is_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.get_client_name(), &client);
    }

    #[test]
    fn test_slave_of_is_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.slave_of("127.0.0.1", 1001), &client);
    }

    #[test]
    fn test_slave_of_empty_host_is_still_illegal_argument() {
        let (mut conn, client) = pipelined_connection();
        assert_illegal_argument(conn.slave_of("", 0));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_slave_of_no_one_is_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.slave_of_no_one(), &client);
    }

    #[test]
    fn test_connection_state_commands_are_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.select(1), &client);
        assert_unsupported(conn.set_client_name("worker"), &client);
    }

    #[test]
    fn test_scans_are_unsupported() {
        let (mut conn, client) = pipelined_connection();
        assert_unsupported(conn.scan(Default::default()), &client);
        assert_unsupported(conn.s_scan("foo", Default::default()), &client);
        assert_unsupported(conn.h_scan("foo", Default::default()), &client);
        assert_unsupported(conn.z_scan("foo", Default::default()), &client);
    }

    #[test]
    fn test_range_checks() {
        let (mut conn, client) = pipelined_connection();
        check_range_validation(&mut conn, &client);
    }

    #[test]
    fn test_sentinel_connection_requires_configuration() {
        let (conn, client) = pipelined_connection();
        let err = conn.get_sentinel_connection().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceUsage);
        assert_eq!(client.calls(), 0);
    }
}

mod sentinel {
    use super::*;

    #[test]
    fn test_first_reachable_sentinel_is_used() {
        let first = RedisNode::new("10.0.0.1", 26379);
        let second = RedisNode::new("10.0.0.2", 26379);
        let (conn, client) = sentinel_connection(vec![first.clone(), second.clone()]);
        client.mark_unreachable(first);

        let sentinel = conn.get_sentinel_connection().unwrap();
        assert_eq!(sentinel.node(), &second);

        let opened = client.sentinels();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].0, second);
        assert_eq!(opened[0].1.executed(), vec![vec!["PING"]]);
    }

    #[test]
    fn test_no_reachable_sentinel() {
        let node = RedisNode::new("10.0.0.1", 26379);
        let (conn, client) = sentinel_connection(vec![node.clone()]);
        client.mark_unreachable(node);

        let err = conn.get_sentinel_connection().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceUsage);
    }

    #[test]
    fn test_sentinel_commands() {
        let node = RedisNode::new("10.0.0.1", 26379);
        let (conn, client) = sentinel_connection(vec![node]);

        let mut sentinel = conn.get_sentinel_connection().unwrap();
        sentinel.failover("mymaster").unwrap();
        sentinel.remove("mymaster").unwrap();
        sentinel
            .monitor(&redbridge::RedisServer::new(
                "other",
                RedisNode::new("10.0.0.9", 6379),
                2,
            ))
            .unwrap();
        sentinel.close().unwrap();
        sentinel.close().unwrap();

        let sentinels = client.sentinels();
        let native = &sentinels[0].1;
        assert_eq!(
            native.executed(),
            vec![
                vec!["PING"],
                vec!["SENTINEL", "FAILOVER", "mymaster"],
                vec!["SENTINEL", "REMOVE", "mymaster"],
                vec!["SENTINEL", "MONITOR", "other", "10.0.0.9", "6379", "2"],
            ]
        );
        assert_eq!(native.quits(), 1);
        assert_eq!(client.quits(), 0);
    }

    #[test]
    fn test_sentinel_masters() {
        use redbridge::proto::frame::Frame;

        let node = RedisNode::new("10.0.0.1", 26379);
        let (conn, client) = sentinel_connection(vec![node]);
        let mut sentinel = conn.get_sentinel_connection().unwrap();

        let sentinels = client.sentinels();
        let native = &sentinels[0].1;
        native.reply(
            "SENTINEL",
            Frame::Array(vec![Frame::Array(vec![
                Frame::bulk("name"),
                Frame::bulk("mymaster"),
                Frame::bulk("ip"),
                Frame::bulk("10.0.0.5"),
                Frame::bulk("port"),
                Frame::bulk("6379"),
            ])]),
        );

        let masters = sentinel.masters().unwrap();
        assert_eq!(masters.len(), 1);
        assert_eq!(masters[0].name, "mymaster");
        assert_eq!(masters[0].node, RedisNode::new("10.0.0.5", 6379));
    }

    #[test]
    fn test_dropping_sentinel_connection_releases_it() {
        let node = RedisNode::new("10.0.0.1", 26379);
        let (conn, client) = sentinel_connection(vec![node]);
        drop(conn.get_sentinel_connection().unwrap());

        assert_eq!(client.sentinels()[0].1.quits(), 1);
    }
}
