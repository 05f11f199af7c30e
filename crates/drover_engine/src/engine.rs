//! Engine facade: working memory, network, agenda, and the run loop.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use drover_foundation::{Error, FactId, Result, Type};
use drover_schema::{Fact, SchemaRegistry};

use crate::agenda::{Activation, Agenda};
use crate::alpha::AlphaNet;
use crate::beta::{JoinId, JoinKey, JoinNode, JoinOutput, JoinTest, Token, TokenField};
use crate::pattern::compile_pattern;
use crate::rule::{CompiledRule, Rule, RuleId};
use crate::wm::FactStore;

/// A propagation step waiting to be processed.
enum Signal {
    /// A fact arrived in a join's right alpha memory.
    Right(JoinId, FactId),
    /// A token arrived at a join's left input.
    Left(JoinId, Token),
}

/// The forward-chaining engine.
///
/// Owns the schema registry, working memory, the compiled Rete
/// network, and the agenda. Single-threaded: one engine instance
/// executes on one logical thread at a time, and `declare`/`retract`
/// propagate synchronously before returning.
pub struct Engine {
    registry: SchemaRegistry,
    wm: FactStore,
    alpha: AlphaNet,
    joins: Vec<JoinNode>,
    rules: Vec<CompiledRule>,
    agenda: Agenda,
    /// Activation sequence counter; breaks salience ties FIFO.
    next_seq: u64,
    /// Set while `run` is executing, to reject reentrant calls.
    running: bool,
    /// Set by `halt`; checked before each pop.
    halted: bool,
    /// Token of the activation currently firing, if any.
    firing: Option<Token>,
}

impl Engine {
    /// Creates an engine over a populated schema registry.
    #[must_use]
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            wm: FactStore::new(),
            alpha: AlphaNet::new(),
            joins: Vec::new(),
            rules: Vec::new(),
            agenda: Agenda::new(),
            next_seq: 0,
            running: false,
            halted: false,
            firing: None,
        }
    }

    /// Returns the schema registry.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Returns the schema registry mutably, e.g. to register further
    /// fact types.
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    /// Looks up a live fact by id.
    #[must_use]
    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        self.wm.get(id)
    }

    /// Number of live facts in working memory.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.wm.len()
    }

    /// Number of pending activations.
    #[must_use]
    pub fn agenda_len(&self) -> usize {
        self.agenda.len()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of alpha memories in the network.
    #[must_use]
    pub fn alpha_memory_count(&self) -> usize {
        self.alpha.len()
    }

    /// Fact ids of the activation currently firing, in pattern order.
    ///
    /// Empty outside of an action. Lets an action retract a fact from
    /// its own matched tuple.
    #[must_use]
    pub fn firing_ids(&self) -> &[FactId] {
        self.firing.as_ref().map_or(&[], Token::ids)
    }

    // =========================================================================
    // Rule registration
    // =========================================================================

    /// Compiles a rule and wires it into the network.
    ///
    /// Facts already in working memory are fed through the new chain,
    /// so matches they complete appear on the agenda immediately.
    ///
    /// # Errors
    ///
    /// Schema errors abort registration and leave the engine
    /// unchanged; calling during `run` is a reentrancy error.
    pub fn register_rule(&mut self, rule: Rule) -> Result<RuleId> {
        if self.running {
            return Err(Error::reentrancy("register_rule"));
        }
        if rule.patterns.is_empty() {
            return Err(Error::empty_rule(rule.name));
        }

        let mut compiled_patterns = Vec::with_capacity(rule.patterns.len());
        for pattern in &rule.patterns {
            let compiled =
                compile_pattern(pattern, &self.registry).map_err(|e| e.in_rule(&rule.name))?;
            compiled_patterns.push(compiled);
        }

        // Resolve shared variables into join keys and var tests into
        // cross-fact join tests, pattern by pattern.
        struct JoinSpec {
            key: Vec<JoinKey>,
            tests: Vec<JoinTest>,
        }
        let mut var_map: HashMap<String, (usize, usize, Type)> = HashMap::new();
        let mut specs: Vec<JoinSpec> = Vec::with_capacity(compiled_patterns.len());
        for (i, compiled) in compiled_patterns.iter().enumerate() {
            let mut key = Vec::new();
            let mut tests = Vec::new();
            let mut bound_here: HashSet<&str> = HashSet::new();

            for (field, ty, variable) in &compiled.bindings {
                if !bound_here.insert(variable.as_str()) {
                    return Err(Error::duplicate_binding(variable).in_rule(&rule.name));
                }
                if let Some(&(pattern, bound_field, bound_ty)) = var_map.get(variable) {
                    if bound_ty != *ty {
                        return Err(Error::type_mismatch(bound_ty, *ty).in_rule(&rule.name));
                    }
                    key.push(JoinKey {
                        left: TokenField {
                            pattern,
                            field: bound_field,
                        },
                        right: *field,
                    });
                } else {
                    var_map.insert(variable.clone(), (i, *field, *ty));
                }
            }

            for (field, ty, op, variable) in &compiled.var_tests {
                let Some(&(pattern, bound_field, bound_ty)) = var_map.get(variable) else {
                    return Err(Error::unbound_variable(variable).in_rule(&rule.name));
                };
                // The operand must come from a strictly earlier pattern
                if pattern >= i {
                    return Err(Error::unbound_variable(variable).in_rule(&rule.name));
                }
                if bound_ty != *ty {
                    return Err(Error::type_mismatch(*ty, bound_ty).in_rule(&rule.name));
                }
                tests.push(JoinTest {
                    left: TokenField {
                        pattern,
                        field: bound_field,
                    },
                    op: *op,
                    right: *field,
                });
            }

            specs.push(JoinSpec { key, tests });
        }

        // Wire the chain: dummy top, one join per pattern, terminal.
        let rule_id = RuleId(self.rules.len());
        let count = compiled_patterns.len();
        let mut join_ids = Vec::with_capacity(count);
        let mut alpha_ids = Vec::with_capacity(count);
        for (i, spec) in specs.into_iter().enumerate() {
            let (alpha_id, created) = self.alpha.intern(compiled_patterns[i].alpha_key.clone());
            if created {
                // A fresh memory indexes the facts already in working memory
                let ty = compiled_patterns[i].alpha_key.fact_type;
                for fid in self.wm.ids_of_type(ty) {
                    let fact = self.wm.get(fid).expect("id listed by type");
                    if self.alpha.memory(alpha_id).accepts(fact) {
                        self.alpha.memory_mut(alpha_id).facts.insert(fid);
                    }
                }
            }

            let join_id = JoinId(self.joins.len());
            let output = if i + 1 == count {
                JoinOutput::Terminal(rule_id)
            } else {
                JoinOutput::Join(JoinId(self.joins.len() + 1))
            };
            self.joins.push(JoinNode {
                rule: rule_id,
                level: i,
                alpha: alpha_id,
                key: spec.key,
                tests: spec.tests,
                left_index: HashMap::new(),
                right_index: HashMap::new(),
                output,
            });
            self.alpha.memory_mut(alpha_id).successors.push(join_id);
            join_ids.push(join_id);
            alpha_ids.push(alpha_id);
        }

        self.rules.push(CompiledRule {
            name: rule.name.clone(),
            salience: rule.salience,
            action: Rc::clone(&rule.action),
            tokens: HashMap::new(),
        });

        // Seed the chain from live working memory: downstream joins
        // get their right index pre-populated, then the first join
        // replays its alpha facts so tokens flow down the chain and
        // probe those entries exactly once.
        for i in 1..count {
            let mut facts: Vec<FactId> = self
                .alpha
                .memory(alpha_ids[i])
                .facts
                .iter()
                .copied()
                .collect();
            facts.sort_unstable();
            for fid in facts {
                let key = {
                    let fact = self.wm.get(fid).expect("alpha member is live");
                    self.joins[join_ids[i].0].right_key(fact)
                };
                self.joins[join_ids[i].0].insert_right(key, fid);
            }
        }
        let mut seed: Vec<FactId> = self
            .alpha
            .memory(alpha_ids[0])
            .facts
            .iter()
            .copied()
            .collect();
        seed.sort_unstable();
        let mut queue: VecDeque<Signal> = seed
            .into_iter()
            .map(|fid| Signal::Right(join_ids[0], fid))
            .collect();
        self.propagate(&mut queue);

        debug!(rule = %rule.name, patterns = count, "registered rule");
        Ok(rule_id)
    }

    // =========================================================================
    // Working memory operations
    // =========================================================================

    /// Asserts a validated fact, propagating it through the network.
    ///
    /// Returns the fact's id. Declaring the same value twice yields
    /// two distinct ids that match rules independently.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFactType` if the fact's type has no registered
    /// schema.
    pub fn declare(&mut self, fact: Fact) -> Result<FactId> {
        self.registry.require_schema(fact.type_id())?;
        let id = self.wm.insert(fact);
        debug!(%id, "declared fact");

        let entered = {
            let fact = self.wm.get(id).expect("fact just inserted");
            self.alpha.insert(id, fact)
        };
        let mut queue = VecDeque::new();
        for memory in entered {
            for &join in &self.alpha.memory(memory).successors {
                queue.push_back(Signal::Right(join, id));
            }
        }
        self.propagate(&mut queue);
        Ok(id)
    }

    /// Retracts a fact, withdrawing every token and activation that
    /// depended on it.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFact` if the id is not live.
    pub fn retract(&mut self, id: FactId) -> Result<()> {
        if !self.wm.contains(id) {
            return Err(Error::unknown_fact(id));
        }
        debug!(%id, "retracting fact");

        {
            let fact = self.wm.get(id).expect("presence checked");
            self.alpha.remove(id, fact);
        }
        for node in &mut self.joins {
            node.retract_fact(id);
        }
        for index in 0..self.rules.len() {
            let rule_id = RuleId(index);
            let withdrawn: Vec<Token> = self.rules[index]
                .tokens
                .keys()
                .filter(|t| t.contains(id))
                .cloned()
                .collect();
            for token in withdrawn {
                trace!(rule = %self.rules[index].name, ?token, "withdrawing match");
                self.rules[index].tokens.remove(&token);
                self.agenda.remove(rule_id, &token);
            }
        }
        self.wm.remove(id);
        Ok(())
    }

    /// Clears working memory, every network memory, and the agenda,
    /// and restarts the fact and sequence counters. Compiled rules
    /// are preserved.
    pub fn reset(&mut self) {
        self.wm.reset();
        self.alpha.clear();
        for node in &mut self.joins {
            node.clear();
        }
        for rule in &mut self.rules {
            rule.tokens.clear();
        }
        self.agenda.clear();
        self.next_seq = 0;
        self.halted = false;
        debug!("engine reset");
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Fires pending activations in priority order until the agenda
    /// empties, `halt` is called, or the fire budget is exhausted.
    ///
    /// Returns the number of activations fired. Actions run with
    /// mutable access to the engine; facts they declare or retract
    /// propagate before the next pop.
    ///
    /// # Errors
    ///
    /// Returns `Reentrancy` when called from within an action, and
    /// `ActionFailed` when an action returns an error (the run is
    /// aborted; working memory and agenda remain consistent).
    pub fn run(&mut self, max_fires: Option<usize>) -> Result<usize> {
        if self.running {
            return Err(Error::reentrancy("run"));
        }
        self.running = true;
        self.halted = false;

        let mut fires = 0;
        let result = loop {
            if self.halted {
                break Ok(fires);
            }
            if let Some(budget) = max_fires {
                if fires >= budget {
                    break Ok(fires);
                }
            }
            let Some(activation) = self.agenda.pop() else {
                break Ok(fires);
            };

            // Resolve the token to a fact tuple; a missing id means the
            // activation is stale and is discarded.
            let Some(facts) = self.resolve(&activation) else {
                continue;
            };

            let rule_name = self.rules[activation.rule.0].name.clone();
            let action = Rc::clone(&self.rules[activation.rule.0].action);
            debug!(rule = %rule_name, seq = activation.seq, "firing");
            self.firing = Some(activation.token.clone());
            let outcome = action(self, &facts);
            self.firing = None;
            if let Err(err) = outcome {
                self.running = false;
                return Err(Error::action_failed(rule_name, err));
            }
            fires += 1;
        };

        self.running = false;
        result
    }

    /// Requests that the current `run` loop stop after the executing
    /// action returns. Callable from rule actions.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    fn resolve(&self, activation: &Activation) -> Option<Vec<Fact>> {
        activation
            .token
            .ids()
            .iter()
            .map(|&id| self.wm.get(id).cloned())
            .collect()
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// Drains the worklist, extending tokens join by join. FIFO order
    /// keeps activation sequence numbers in creation order.
    fn propagate(&mut self, queue: &mut VecDeque<Signal>) {
        while let Some(signal) = queue.pop_front() {
            match signal {
                Signal::Right(join, fid) => {
                    let Some(fact) = self.wm.get(fid) else {
                        continue;
                    };
                    let node = &self.joins[join.0];
                    let output = node.output;
                    let key = node.right_key(fact);
                    let mut extended = Vec::new();
                    for token in node.left_matches(&key) {
                        if node.passes_tests(&token, fact, &self.wm) {
                            extended.push(token.extend(fid));
                        }
                    }
                    self.joins[join.0].insert_right(key, fid);
                    for token in extended {
                        self.emit(output, token, queue);
                    }
                }
                Signal::Left(join, token) => {
                    let node = &self.joins[join.0];
                    let output = node.output;
                    let Some(key) = node.left_key(&token, &self.wm) else {
                        continue;
                    };
                    let mut extended = Vec::new();
                    for fid in node.right_matches(&key) {
                        let Some(fact) = self.wm.get(fid) else {
                            continue;
                        };
                        if node.passes_tests(&token, fact, &self.wm) {
                            extended.push(token.extend(fid));
                        }
                    }
                    self.joins[join.0].insert_left(key, token);
                    for extended_token in extended {
                        self.emit(output, extended_token, queue);
                    }
                }
            }
        }
    }

    fn emit(&mut self, output: JoinOutput, token: Token, queue: &mut VecDeque<Signal>) {
        match output {
            JoinOutput::Join(next) => queue.push_back(Signal::Left(next, token)),
            JoinOutput::Terminal(rule) => self.activate_terminal(rule, token),
        }
    }

    /// Records a complete match and schedules its activation.
    fn activate_terminal(&mut self, rule: RuleId, token: Token) {
        if self.rules[rule.0].tokens.contains_key(&token) {
            // One alpha memory per canonical filter and one chain per
            // rule make duplicate derivations impossible.
            debug_assert!(false, "duplicate derivation of {token:?}");
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;

        let compiled = &mut self.rules[rule.0];
        trace!(rule = %compiled.name, ?token, seq, "complete match");
        compiled.tokens.insert(token.clone(), seq);
        self.agenda.insert(Activation {
            rule,
            token,
            salience: compiled.salience,
            seq,
        });
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("facts", &self.wm.len())
            .field("rules", &self.rules.len())
            .field("alpha_memories", &self.alpha.len())
            .field("joins", &self.joins.len())
            .field("agenda", &self.agenda.len())
            .finish_non_exhaustive()
    }
}
