//! Flight crew scheduling fixtures.
//!
//! Employees are assigned to the crew slots of flights. Each slot requires
//! one skill; an employee cannot fly two overlapping flights, must depart
//! from where their previous flight arrived, and should start and end at
//! their home airport.
//!
//! Times are minutes since the start of the schedule; a day is 1440 minutes.

use std::sync::Arc;

use plansmith_core::{
    Entity, EntityClassDef, Fact, FactClassDef, FieldDef, FieldId, HardSoftScore, Problem,
    ProblemBuilder, ProblemDescriptor, Row, Value, ValueRangeDef,
};
use plansmith_scoring::joiner::{equal, filtering, greater_than, less_than, overlapping};
use plansmith_scoring::{Constraint, ConstraintFactory, ConstraintGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const AIRPORT: &str = "Airport";
pub const EMPLOYEE: &str = "Employee";
pub const FLIGHT: &str = "Flight";
pub const ASSIGNMENT: &str = "FlightAssignment";

pub const MINUTES_PER_DAY: i64 = 1440;
pub const PILOT: &str = "Pilot";
pub const ATTENDANT: &str = "Flight attendant";

// Fact class positions in `descriptor()`.
const AIRPORT_CLASS: usize = 0;
const EMPLOYEE_CLASS: usize = 1;
const FLIGHT_CLASS: usize = 2;

pub fn descriptor() -> Arc<ProblemDescriptor> {
    Arc::new(
        ProblemDescriptor::builder()
            .fact_class(FactClassDef::new(AIRPORT, ["code"]))
            .fact_class(FactClassDef::new(
                EMPLOYEE,
                ["name", "home_airport", "skills", "unavailable_days"],
            ))
            .fact_class(FactClassDef::new(
                FLIGHT,
                [
                    "flight_number",
                    "departure_airport",
                    "departure_time",
                    "arrival_airport",
                    "arrival_time",
                ],
            ))
            .entity_class(EntityClassDef::new(
                ASSIGNMENT,
                vec![
                    FieldDef::new("flight"),
                    FieldDef::new("index_in_flight"),
                    FieldDef::new("required_skill"),
                    FieldDef::planning_variable("employee", ValueRangeDef::facts(EMPLOYEE)),
                ],
            ))
            .build()
            .expect("flight crew descriptor is valid"),
    )
}

pub fn builder() -> ProblemBuilder<HardSoftScore> {
    Problem::builder(descriptor())
}

pub fn constraint_graph(descriptor: Arc<ProblemDescriptor>) -> Arc<ConstraintGraph<HardSoftScore>> {
    Arc::new(
        ConstraintGraph::build(descriptor, define_constraints)
            .expect("flight crew constraints are valid"),
    )
}

pub fn airport(id: i64, code: &str) -> Fact {
    Fact::new(id, vec![Value::from(code)])
}

pub fn employee(id: i64, name: &str, home: i64, skills: &[&str], unavailable_days: &[i64]) -> Fact {
    Fact::new(
        id,
        vec![
            Value::from(name),
            Value::fact(AIRPORT_CLASS, home),
            Value::List(skills.iter().map(|&s| Value::from(s)).collect()),
            Value::List(unavailable_days.iter().map(|&d| Value::Int(d)).collect()),
        ],
    )
}

pub fn flight(id: i64, from: i64, departure: i64, to: i64, arrival: i64) -> Fact {
    Fact::new(
        id,
        vec![
            Value::text(format!("FL{id:03}")),
            Value::fact(AIRPORT_CLASS, from),
            Value::Int(departure),
            Value::fact(AIRPORT_CLASS, to),
            Value::Int(arrival),
        ],
    )
}

pub fn assignment(id: i64, flight: i64, index: i64, skill: &str, employee: Option<i64>) -> Entity {
    Entity::new(
        id,
        vec![
            Value::fact(FLIGHT_CLASS, flight),
            Value::Int(index),
            Value::from(skill),
            employee_ref(employee),
        ],
    )
}

pub fn employee_ref(employee: Option<i64>) -> Value {
    employee.map_or(Value::None, |id| Value::fact(EMPLOYEE_CLASS, id))
}

/// A seeded instance: four airports, `flights` flights over three days, each
/// with a pilot and an attendant slot, and `employees` employees. About half
/// of the slots start assigned.
pub fn generate(seed: u64, flights: usize, employees: usize) -> Problem<HardSoftScore> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = builder();
    for (id, code) in ["LHR", "JFK", "CDG", "BRU"].into_iter().enumerate() {
        builder = builder.fact(AIRPORT, airport(id as i64, code));
    }

    for id in 0..employees as i64 {
        let skill = if id % 2 == 0 { PILOT } else { ATTENDANT };
        let unavailable: Vec<i64> = (0..3).filter(|_| rng.random_bool(0.2)).collect();
        builder = builder.fact(
            EMPLOYEE,
            employee(id, &format!("Crew {id}"), rng.random_range(0..4), &[skill], &unavailable),
        );
    }

    let mut slot = 0;
    for id in 0..flights as i64 {
        let from = rng.random_range(0..4);
        let to = (from + rng.random_range(1..4)) % 4;
        let departure = rng.random_range(0..3 * MINUTES_PER_DAY - 600);
        let arrival = departure + rng.random_range(60..540);
        builder = builder.fact(FLIGHT, flight(id, from, departure, to, arrival));
        for (index, skill) in [PILOT, ATTENDANT].into_iter().enumerate() {
            let employee = if employees > 0 && rng.random_bool(0.5) {
                Some(rng.random_range(0..employees as i64))
            } else {
                None
            };
            builder = builder.entity(ASSIGNMENT, assignment(slot, id, index as i64, skill, employee));
            slot += 1;
        }
    }
    builder.build().expect("generated flight crew problem is valid")
}

#[derive(Debug, Clone, Copy)]
struct Fields {
    flight: FieldId,
    required_skill: FieldId,
    employee: FieldId,
    home_airport: FieldId,
    skills: FieldId,
    unavailable_days: FieldId,
    departure_airport: FieldId,
    departure_time: FieldId,
    arrival_airport: FieldId,
    arrival_time: FieldId,
}

impl Fields {
    fn new(factory: &ConstraintFactory<HardSoftScore>) -> Self {
        Self {
            flight: factory.field(ASSIGNMENT, "flight"),
            required_skill: factory.field(ASSIGNMENT, "required_skill"),
            employee: factory.field(ASSIGNMENT, "employee"),
            home_airport: factory.field(EMPLOYEE, "home_airport"),
            skills: factory.field(EMPLOYEE, "skills"),
            unavailable_days: factory.field(EMPLOYEE, "unavailable_days"),
            departure_airport: factory.field(FLIGHT, "departure_airport"),
            departure_time: factory.field(FLIGHT, "departure_time"),
            arrival_airport: factory.field(FLIGHT, "arrival_airport"),
            arrival_time: factory.field(FLIGHT, "arrival_time"),
        }
    }

    fn flight_field(self, assignment: &Row<'_>, field: FieldId) -> Value {
        assignment
            .resolve(self.flight)
            .map_or(Value::None, |f| f.get(field).clone())
    }

    fn departure(self, assignment: &Row<'_>) -> Value {
        self.flight_field(assignment, self.departure_time)
    }

    fn arrival(self, assignment: &Row<'_>) -> Value {
        self.flight_field(assignment, self.arrival_time)
    }

    fn employee(self, assignment: &Row<'_>) -> Value {
        assignment.get(self.employee).clone()
    }
}

pub fn define_constraints(factory: &ConstraintFactory<HardSoftScore>) -> Vec<Constraint<HardSoftScore>> {
    vec![
        required_skill(factory),
        flight_conflict(factory),
        transfer_between_two_flights(factory),
        employee_unavailability(factory),
        first_assignment_not_departing_from_home(factory),
        last_assignment_not_arriving_at_home(factory),
    ]
}

pub fn required_skill(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(ASSIGNMENT)
        .filter(move |t| {
            let assignment = t.row(0);
            assignment
                .resolve(f.employee)
                .is_some_and(|e| !e.list(f.skills).contains(assignment.get(f.required_skill)))
        })
        .penalize(HardSoftScore::of_hard(100))
        .as_constraint("Required skill")
}

pub fn flight_conflict(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each_unique_pair(
            ASSIGNMENT,
            vec![
                equal(move |t| f.employee(&t.row(0)), move |r| f.employee(r)),
                overlapping(
                    move |t| f.departure(&t.row(0)),
                    move |t| f.arrival(&t.row(0)),
                    move |r| f.departure(r),
                    move |r| f.arrival(r),
                ),
            ],
        )
        .penalize(HardSoftScore::of_hard(10))
        .as_constraint("Flight conflict")
}

pub fn transfer_between_two_flights(
    factory: &ConstraintFactory<HardSoftScore>,
) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(ASSIGNMENT)
        .join(
            ASSIGNMENT,
            vec![
                equal(move |t| f.employee(&t.row(0)), move |r| f.employee(r)),
                less_than(move |t| f.departure(&t.row(0)), move |r| f.departure(r)),
                filtering(|t, r| t.row(0).id() != r.id()),
            ],
        )
        .if_not_exists(
            ASSIGNMENT,
            vec![
                equal(move |t| f.employee(&t.row(0)), move |r| f.employee(r)),
                filtering(move |t, other| {
                    let (first, second) = (t.row(0), t.row(1));
                    let departure = f.departure(other);
                    other.id() != first.id()
                        && other.id() != second.id()
                        && departure >= f.departure(&first)
                        && departure < f.departure(&second)
                }),
            ],
        )
        .filter(move |t| {
            f.flight_field(&t.row(0), f.arrival_airport)
                != f.flight_field(&t.row(1), f.departure_airport)
        })
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Transfer between two flights")
}

pub fn employee_unavailability(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(ASSIGNMENT)
        .filter(move |t| {
            let assignment = t.row(0);
            let (Some(employee), Some(departure), Some(arrival)) = (
                assignment.resolve(f.employee),
                f.departure(&assignment).as_int(),
                f.arrival(&assignment).as_int(),
            ) else {
                return false;
            };
            let days = departure / MINUTES_PER_DAY..=arrival / MINUTES_PER_DAY;
            employee
                .list(f.unavailable_days)
                .iter()
                .filter_map(Value::as_int)
                .any(|day| days.contains(&day))
        })
        .penalize(HardSoftScore::of_hard(10))
        .as_constraint("Employee unavailable")
}

pub fn first_assignment_not_departing_from_home(
    factory: &ConstraintFactory<HardSoftScore>,
) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(EMPLOYEE)
        .join(
            ASSIGNMENT,
            vec![equal(|t| t.row(0).identity(), move |r| f.employee(r))],
        )
        .if_not_exists(
            ASSIGNMENT,
            vec![
                equal(|t| t.row(0).identity(), move |r| f.employee(r)),
                greater_than(move |t| f.departure(&t.row(1)), move |r| f.departure(r)),
            ],
        )
        .filter(move |t| {
            *t.row(0).get(f.home_airport) != f.flight_field(&t.row(1), f.departure_airport)
        })
        .penalize(HardSoftScore::of_soft(1000))
        .as_constraint("First assignment not departing from home")
}

pub fn last_assignment_not_arriving_at_home(
    factory: &ConstraintFactory<HardSoftScore>,
) -> Constraint<HardSoftScore> {
    let f = Fields::new(factory);
    factory
        .for_each(EMPLOYEE)
        .join(
            ASSIGNMENT,
            vec![equal(|t| t.row(0).identity(), move |r| f.employee(r))],
        )
        .if_not_exists(
            ASSIGNMENT,
            vec![
                equal(|t| t.row(0).identity(), move |r| f.employee(r)),
                less_than(move |t| f.departure(&t.row(1)), move |r| f.departure(r)),
            ],
        )
        .filter(move |t| {
            *t.row(0).get(f.home_airport) != f.flight_field(&t.row(1), f.arrival_airport)
        })
        .penalize(HardSoftScore::of_soft(1000))
        .as_constraint("Last assignment not arriving at home")
}
