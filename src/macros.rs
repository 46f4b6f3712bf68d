//! Macros for ergonomic state definitions.

/// Declare a unit-struct state definition.
///
/// Generates the struct (deriving `Clone`, `Copy`, `Debug` and `Default`)
/// and its `StateDef` implementation. The concrete name is the struct name.
///
/// # Example
///
/// ```
/// use hsm_engine::core::Node;
/// use hsm_engine::define_state;
///
/// define_state! {
///     /// Waiting for a green light.
///     pub struct Stopped: &'static str {
///         tag: "Signal",
///         id: "stopped",
///     }
///     setup(state) {
///         state.on("green", Moving);
///     }
/// }
///
/// define_state! {
///     pub struct Moving: &'static str {
///         tag: "Signal",
///         id: "moving",
///     }
///     setup(state) {
///         state.on("red", Stopped);
///     }
/// }
///
/// let car = Node::new("Car", "c1");
/// car.add_state(Stopped);
/// car.send("green");
/// assert_eq!(car.states()[0].to_string(), "Moving (Signal moving)");
/// ```
#[macro_export]
macro_rules! define_state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $key:ty {
            tag: $tag:expr,
            id: $id:expr $(,)?
        }
        setup($builder:ident) $body:block
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        $vis struct $name;

        impl $crate::core::StateDef<$key> for $name {
            fn id(&self) -> $key {
                $id
            }

            fn name(&self) -> &str {
                stringify!($name)
            }

            fn tag(&self) -> &str {
                $tag
            }

            #[allow(unused_variables)]
            fn setup(&self, $builder: &mut $crate::core::StateBuilder<'_, $key>) $body
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Node, StateDef};

    define_state! {
        struct Locked: u8 {
            tag: "Door",
            id: 0,
        }
        setup(state) {
            state.on("unlock", Unlocked);
        }
    }

    define_state! {
        struct Unlocked: u8 {
            tag: "Door",
            id: 1
        }
        setup(state) {}
    }

    #[test]
    fn define_state_macro_generates_trait() {
        assert_eq!(Locked.id(), 0);
        assert_eq!(Locked.name(), "Locked");
        assert_eq!(Locked.tag(), "Door");
    }

    #[test]
    fn generated_states_transition() {
        let door = Node::new("Door", 5u8);
        door.add_state(Locked);

        door.send("unlock");

        assert_eq!(door.states()[0].name(), "Unlocked");
        assert_eq!(door.states()[0].transitions().len(), 0);
    }
}
