/// Asserts that the agent with the given ID currently feels `$emotion`.
#[allow(unused_macros)]
macro_rules! assert_emotion {
    ($world:expr, $id:expr, $emotion:expr) => {
        let agent = $world.agent($id).expect("Agent not found in world");
        assert_eq!(
            agent.state.emotion, $emotion,
            "Agent {} has emotion {:?}, expected {:?}",
            $id, agent.state.emotion, $emotion
        );
    };
}

/// Asserts the intensity bounds and the `Neutral <=> 0` rule for every agent.
#[allow(unused_macros)]
macro_rules! assert_all_consistent {
    ($world:expr) => {
        for agent in $world.agents() {
            assert!(
                agent.state.is_consistent(),
                "Agent {} is inconsistent: {:?}",
                agent.id,
                agent.state
            );
        }
    };
}

/// Asserts the number of contagion events an agent has received.
#[allow(unused_macros)]
macro_rules! assert_contagion_events {
    ($world:expr, $id:expr, $count:expr) => {
        let agent = $world.agent($id).expect("Agent not found in world");
        let events = agent.empathy.map_or(0, |e| e.contagion_events);
        assert_eq!(events, $count, "Agent {} contagion events mismatch", $id);
    };
}
