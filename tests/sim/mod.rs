use smolrpl::iface::rpl::consts;
use smolrpl::iface::*;
use smolrpl::time::*;
use smolrpl::wire::*;

mod message;
mod node;

pub use message::Message;
pub use node::{Engine, Node, Outbox};

/// The global address a node advertises in its DAOs.
pub fn global_address(id: usize) -> Ipv6Address {
    Ipv6Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, id as u16 + 1)
}

/// A root node, which joined a grounded DAG with Rank ROOT.
pub fn root_builder(dodag_id: Ipv6Address) -> RplBuilder {
    let mut dag = Dag::new(consts::RPL_DEFAULT_INSTANCE, dodag_id);
    dag.joined = true;
    dag.grounded = true;
    dag.set_rank(consts::DEFAULT_MIN_HOP_RANK_INCREASE);
    RplBuilder::new().add_dag(dag)
}

/// Every node hears every other node.
#[derive(Debug)]
pub struct NetworkSim {
    pub nodes: Vec<Node>,
    pub messages: Vec<Message>,
    pub now: Instant,
}

impl Default for NetworkSim {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSim {
    /// Create a new network simulation.
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        Self {
            nodes: vec![],
            messages: vec![],
            now: Instant::ZERO,
        }
    }

    /// Create a new node.
    pub fn create_node(&mut self, builder: RplBuilder) -> &mut Node {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, builder));
        &mut self.nodes[id]
    }

    pub fn node(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Return the messages that were transmitted.
    pub fn msgs(&self) -> &[Message] {
        &self.messages
    }

    /// Deliver every queued message once, and return how many were sent.
    pub fn step(&mut self) -> usize {
        let mut sent = vec![];
        for node in self.nodes.iter_mut() {
            for (dst_addr, code, data) in node.outbox.queue.drain(..) {
                sent.push(Message {
                    at: self.now,
                    from: node.id,
                    src_addr: node.address,
                    dst_addr,
                    code,
                    data,
                });
            }
        }

        for msg in &sent {
            let (src_addr, src_hw_addr) = {
                let from = &self.nodes[msg.from];
                (from.address, from.hardware_addr)
            };

            for node in self.nodes.iter_mut() {
                if node.id == msg.from || !node.accepts(msg.dst_addr) {
                    continue;
                }
                let _ = node.receive(
                    src_addr,
                    src_hw_addr,
                    msg.dst_addr,
                    msg.code,
                    &msg.data,
                    self.now,
                );
            }
        }

        let count = sent.len();
        self.messages.extend(sent);
        self.now += Duration::from_millis(100);
        count
    }

    /// Step until no node has anything left to send.
    pub fn run(&mut self) {
        while self.step() > 0 {}
    }
}
